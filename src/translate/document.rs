//! Translator for the JSON document column, addressed by a path suffix on
//! the attribute name (`data.name.givenName`, `data.tags[0]`).
//!
//! Comparisons wrap the column in `json_extract` with the resolved path;
//! `$has`/`$nhas` probe the path via `json_type`; `$contains`/`$ncontains`
//! enumerate the path's direct children with a correlated `json_each`
//! subquery. Structural operands (arrays, objects, booleans) are serialized
//! to canonical JSON text before comparison.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

use super::{OperatorFn, TranslationContext, Translator, WalkEnv};
use crate::error::{FilterError, FilterResult};
use crate::expression::{self, Expression, SqlArg};
use crate::registry::{self, DOCUMENT_ATTRIBUTE};

#[derive(Debug)]
pub(crate) struct DocumentTranslator;

lazy_static! {
    /// Dotted/bracketed path suffix grammar: `.segment` or `[index]`, one or
    /// more times.
    static ref PATH_SUFFIX: Regex =
        Regex::new(r"^(?:\.[A-Za-z0-9_]+|\[\d+\])+$").expect("path suffix pattern");
}

static OPERATORS: &[(&str, OperatorFn)] = &[
    ("$eq", op_eq),
    ("$neq", op_neq),
    ("$like", op_like),
    ("$nlike", op_nlike),
    ("$gt", op_gt),
    ("$gte", op_gte),
    ("$lt", op_lt),
    ("$lte", op_lte),
    ("$in", op_in),
    ("$nin", op_nin),
    ("$has", op_has),
    ("$nhas", op_nhas),
    ("$contains", op_contains),
    ("$ncontains", op_ncontains),
];

fn path_of(ctx: &TranslationContext) -> FilterResult<String> {
    ctx.path.clone().ok_or_else(|| {
        FilterError::Internal(format!(
            "attribute '{}' reached the document translator without a resolved path",
            ctx.attribute
        ))
    })
}

/// Canonicalize an operand for comparison against `json_extract` output:
/// strings, numbers and null pass through, everything structural becomes its
/// JSON text form.
fn operand_value(value: &Value) -> FilterResult<Value> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Null => Ok(value.clone()),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            Ok(Value::String(serde_json::to_string(value)?))
        }
    }
}

fn push_comparison(
    ctx: &mut TranslationContext,
    value: &Value,
    build: fn(&str, &str, &Value, Option<&str>, &[&str]) -> Expression,
) -> FilterResult<()> {
    let path = path_of(ctx)?;
    let operand = operand_value(value)?;
    let expr = build(&ctx.table, &ctx.column, &operand, Some("json_extract"), &[&path]);
    ctx.push(expr);
    Ok(())
}

fn op_eq(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    push_comparison(ctx, value, expression::equals)
}

fn op_neq(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    push_comparison(ctx, value, expression::not_equals)
}

fn op_like(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    push_comparison(ctx, value, expression::like)
}

fn op_nlike(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    push_comparison(ctx, value, expression::not_like)
}

fn op_gt(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    push_comparison(ctx, value, expression::greater_than)
}

fn op_gte(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    push_comparison(ctx, value, expression::greater_than_equal)
}

fn op_lt(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    push_comparison(ctx, value, expression::lower_than)
}

fn op_lte(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    push_comparison(ctx, value, expression::lower_than_equal)
}

fn op_in(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let path = path_of(ctx)?;
    let operand = match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(operand_value)
                .collect::<FilterResult<Vec<_>>>()?,
        ),
        other => operand_value(other)?,
    };
    let expr = expression::in_values(&ctx.table, &ctx.column, &operand, Some("json_extract"), &[&path]);
    ctx.push(expr);
    Ok(())
}

fn op_nin(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let path = path_of(ctx)?;
    let operand = match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(operand_value)
                .collect::<FilterResult<Vec<_>>>()?,
        ),
        other => operand_value(other)?,
    };
    let expr =
        expression::not_in_values(&ctx.table, &ctx.column, &operand, Some("json_extract"), &[&path]);
    ctx.push(expr);
    Ok(())
}

/// Path plus one key segment, the key JSON-encoded so embedded dots stay one
/// segment.
fn keyed_path(ctx: &TranslationContext, key: &Value) -> FilterResult<String> {
    let path = path_of(ctx)?;
    let encoded = serde_json::to_string(key)?;
    Ok(format!("{}.{}", path, encoded))
}

fn op_has(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let path = keyed_path(ctx, value)?;
    let expr = expression::not_equals(&ctx.table, &ctx.column, &Value::Null, Some("json_type"), &[&path]);
    ctx.push(expr);
    Ok(())
}

fn op_nhas(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let path = keyed_path(ctx, value)?;
    let expr = expression::equals(&ctx.table, &ctx.column, &Value::Null, Some("json_type"), &[&path]);
    ctx.push(expr);
    Ok(())
}

fn containment(ctx: &mut TranslationContext, value: &Value, negated: bool) -> FilterResult<()> {
    let path = path_of(ctx)?.replace('\'', "''");
    let prefix = if negated { "NOT EXISTS" } else { "EXISTS" };

    let expr = match value {
        Value::Array(items) => {
            let serialized = items
                .iter()
                .map(operand_value)
                .collect::<FilterResult<Vec<_>>>()?;
            let placeholders = vec!["?"; serialized.len()].join(", ");
            let template = format!(
                "{prefix} (SELECT 1 FROM json_each({table}.{column}, '{path}') WHERE json_each.value IN ({placeholders}) HAVING COUNT(json_each.value) >= ?)",
                prefix = prefix,
                table = ctx.table,
                column = ctx.column,
                path = path,
                placeholders = placeholders,
            );
            let mut args: Vec<SqlArg> = serialized.into_iter().map(SqlArg::Value).collect();
            args.push(SqlArg::Value(json!(args.len())));
            Expression::new(template, args)
        }
        other => {
            let template = format!(
                "{prefix} (SELECT 1 FROM json_each({table}.{column}, '{path}') WHERE json_each.value = ?)",
                prefix = prefix,
                table = ctx.table,
                column = ctx.column,
                path = path,
            );
            Expression::new(template, vec![SqlArg::Value(operand_value(other)?)])
        }
    };
    ctx.push(expr);
    Ok(())
}

fn op_contains(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    containment(ctx, value, false)
}

fn op_ncontains(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    containment(ctx, value, true)
}

impl Translator for DocumentTranslator {
    fn name(&self) -> &'static str {
        "document"
    }

    fn resolve(&self, ctx: &mut TranslationContext, env: &WalkEnv) -> FilterResult<()> {
        let suffix = &ctx.attribute[DOCUMENT_ATTRIBUTE.len()..];
        let path = if suffix.is_empty() {
            "$".to_string()
        } else if PATH_SUFFIX.is_match(suffix) {
            format!("${}", suffix)
        } else {
            return Err(FilterError::InvalidPathPrefix {
                attribute: ctx.attribute.to_string(),
                suffix: suffix.to_string(),
            });
        };

        let (table, column) = registry::table_of_field(DOCUMENT_ATTRIBUTE, env.overwrite)?;
        ctx.table = table;
        ctx.column = column;
        ctx.path = Some(path);
        Ok(())
    }

    fn operators(&self) -> &'static [(&'static str, OperatorFn)] {
        OPERATORS
    }

    fn apply_shorthand(&self, ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
        // Arrays and objects are document values here, not operator sugar,
        // so every shorthand shape is an equality check.
        op_eq(ctx, value)
    }
}
