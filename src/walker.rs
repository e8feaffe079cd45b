//! Boolean tree walker: interprets the filter tree and drives per-leaf
//! translation.
//!
//! Objects default to AND, arrays to OR, unless an ancestor combinator
//! already forced a type. `$and`/`$or` recurse in place and flatten;
//! `$and()`/`$or()` compile their children into an isolated scope folded
//! back as one parenthesized unit. Every other key is an attribute leaf.

use serde_json::Value;
use tracing::debug;

use crate::criteria::QueryCriteria;
use crate::error::FilterResult;
use crate::expression::{Combinator, Scope};
use crate::registry::TableLookup;
use crate::translate::{self, WalkEnv};

/// Compile `criteria.filter` and attach the resulting predicate to `scope`.
///
/// Does nothing when the filter member is absent or not an object/array.
/// On error the scope may already contain expressions from sibling leaves
/// processed earlier; callers treat the scope as spent in that case.
pub fn apply_criteria_filter(
    scope: &mut Scope,
    allowed_attributes: &[&str],
    criteria: &QueryCriteria,
    overwrite_tables: Option<&TableLookup>,
) -> FilterResult<()> {
    let node = match &criteria.filter {
        Some(value) if value.is_object() || value.is_array() => value,
        _ => return Ok(()),
    };
    let env = WalkEnv {
        allowed: allowed_attributes,
        overwrite: overwrite_tables,
    };
    walk(node, &env, scope, 1, None)
}

fn walk(
    node: &Value,
    env: &WalkEnv,
    scope: &mut Scope,
    depth: u32,
    forced: Option<Combinator>,
) -> FilterResult<()> {
    match node {
        Value::Array(items) => {
            let combinator = forced.unwrap_or(Combinator::Or);
            for item in items {
                walk(item, env, scope, depth, Some(combinator))?;
            }
            Ok(())
        }
        Value::Object(map) => {
            let combinator = forced.unwrap_or(Combinator::And);
            for (key, value) in map {
                match key.as_str() {
                    "$and" => walk(value, env, scope, depth + 1, Some(Combinator::And))?,
                    "$or" => walk(value, env, scope, depth + 1, Some(Combinator::Or))?,
                    "$and()" => {
                        let mut isolated = Scope::new();
                        walk(value, env, &mut isolated, depth + 1, Some(Combinator::And))?;
                        scope.push_group(isolated, combinator);
                    }
                    "$or()" => {
                        let mut isolated = Scope::new();
                        walk(value, env, &mut isolated, depth + 1, Some(Combinator::Or))?;
                        scope.push_group(isolated, combinator);
                    }
                    attribute => {
                        translate::translate_leaf(attribute, value, env, scope, combinator)?
                    }
                }
            }
            Ok(())
        }
        other => {
            debug!("ignoring non-object filter node: {}", other);
            Ok(())
        }
    }
}
