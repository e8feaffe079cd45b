//! Translator for membership attributes backed by a join table.
//!
//! A child attribute names a set of foreign-key rows, so single-row
//! predicates cannot express its operators. Criteria accumulate into a
//! private WHERE scope plus a private HAVING scope, and finalize wraps both
//! into a membership subquery against the owning entity id. Set equality and
//! superset checks ride on `COUNT` refinements; `$neq` and `$ncontains`
//! synthesize their complete subquery predicate directly.

use serde_json::{json, Value};
use tracing::debug;

use super::{relational, OperatorFn, TranslationContext, Translator, WalkEnv};
use crate::error::{FilterError, FilterResult};
use crate::expression::{self, Expression, Scope, SqlArg};
use crate::registry::{self, ChildAttribute};

#[derive(Debug)]
pub(crate) struct ChildAttributeTranslator;

static OPERATORS: &[(&str, OperatorFn)] = &[
    ("$eq", op_eq),
    ("$neq", op_neq),
    ("$contains", op_contains),
    ("$ncontains", op_ncontains),
    ("$like", relational::op_like),
    ("$nlike", relational::op_nlike),
    ("$gt", relational::op_gt),
    ("$gte", relational::op_gte),
    ("$lt", relational::op_lt),
    ("$lte", relational::op_lte),
    ("$in", relational::op_in),
    ("$nin", relational::op_nin),
];

fn child_of(ctx: &TranslationContext) -> FilterResult<&'static ChildAttribute> {
    ctx.child.ok_or_else(|| {
        FilterError::Internal(format!(
            "attribute '{}' reached the child translator without a join-table descriptor",
            ctx.attribute
        ))
    })
}

fn values_of(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Membership plus exact cardinality: the join-set must be exactly the
/// target set.
fn op_eq(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let values = values_of(value);
    let membership =
        expression::in_values(&ctx.table, &ctx.column, &Value::Array(values.clone()), None, &[]);
    ctx.push(membership);

    let count = expression::equals(
        &ctx.table,
        &ctx.column,
        &json!(values.len()),
        Some("COUNT"),
        &[],
    );
    ctx.push_having(count);
    Ok(())
}

/// Membership plus lower-bound cardinality: the join-set must be a superset
/// of the target set.
fn op_contains(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let values = values_of(value);
    let membership =
        expression::in_values(&ctx.table, &ctx.column, &Value::Array(values.clone()), None, &[]);
    ctx.push(membership);

    let count = expression::greater_than_equal(
        &ctx.table,
        &ctx.column,
        &json!(values.len()),
        Some("COUNT"),
        &[],
    );
    ctx.push_having(count);
    Ok(())
}

/// The join-set differs from the target set in cardinality or membership.
///
/// Kept as the two-branch UNION: owners whose member count differs from the
/// target length, unioned with owners holding any member outside the target
/// set. Owners with no join rows at all match neither branch; see the
/// behavior tests before changing this.
fn op_neq(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let child = child_of(ctx)?;
    let values = values_of(value);
    let placeholders = vec!["?"; values.len()].join(", ");

    let template = format!(
        "{owner}.{owner_id} IN (SELECT {joc} FROM {jt} GROUP BY {joc} HAVING COUNT({jt}.{jvc}) != ? UNION SELECT {joc} FROM {jt} WHERE {jt}.{jvc} NOT IN ({placeholders}))",
        owner = child.owner_table,
        owner_id = child.owner_id_column,
        joc = child.join_owner_column,
        jt = child.join_table,
        jvc = child.join_value_column,
        placeholders = placeholders,
    );

    let mut args = vec![SqlArg::Value(json!(values.len()))];
    args.extend(values.into_iter().map(SqlArg::Value));
    ctx.push_outer(Expression::new(template, args));
    Ok(())
}

/// The join-set holds none of the given members.
fn op_ncontains(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let child = child_of(ctx)?;
    let values = values_of(value);
    let placeholders = vec!["?"; values.len()].join(", ");

    let template = format!(
        "{owner}.{owner_id} NOT IN (SELECT {joc} FROM {jt} WHERE {jt}.{jvc} IN ({placeholders}))",
        owner = child.owner_table,
        owner_id = child.owner_id_column,
        joc = child.join_owner_column,
        jt = child.join_table,
        jvc = child.join_value_column,
        placeholders = placeholders,
    );

    ctx.push_outer(Expression::new(
        template,
        values.into_iter().map(SqlArg::Value).collect(),
    ));
    Ok(())
}

impl Translator for ChildAttributeTranslator {
    fn name(&self) -> &'static str {
        "child"
    }

    fn resolve(&self, ctx: &mut TranslationContext, _env: &WalkEnv) -> FilterResult<()> {
        let child = registry::child_attribute(ctx.attribute).ok_or_else(|| {
            FilterError::Internal(format!(
                "no join-table descriptor for child attribute '{}'",
                ctx.attribute
            ))
        })?;
        ctx.table = child.join_table.to_string();
        ctx.column = child.join_value_column.to_string();
        ctx.child = Some(child);
        Ok(())
    }

    fn operators(&self) -> &'static [(&'static str, OperatorFn)] {
        OPERATORS
    }

    fn apply_shorthand(&self, ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
        match value {
            // For a set-valued attribute the array shorthand means "exactly
            // this set", not "one of".
            Value::Array(_)
            | Value::String(_)
            | Value::Number(_)
            | Value::Bool(_)
            | Value::Null => op_eq(ctx, value),
            _ => {
                debug!(
                    "ignoring unsupported criteria shorthand for attribute '{}'",
                    ctx.attribute
                );
                Ok(())
            }
        }
    }

    fn finalize(&self, ctx: TranslationContext, scope: &mut Scope) -> FilterResult<()> {
        let combinator = ctx.combinator;
        let child = child_of(&ctx)?;

        if !ctx.scope.is_empty() || !ctx.having.is_empty() {
            let mut subquery = format!(
                "SELECT {joc} FROM {jt}",
                joc = child.join_owner_column,
                jt = child.join_table,
            );
            let mut args = Vec::new();
            if let Some(where_expr) = ctx.scope.to_expression() {
                subquery.push_str(" WHERE ?");
                args.push(SqlArg::Expr(where_expr));
            }
            if let Some(having_expr) = ctx.having.to_expression() {
                subquery.push_str(&format!(
                    " GROUP BY {} HAVING ?",
                    child.join_owner_column
                ));
                args.push(SqlArg::Expr(having_expr));
            }
            let membership = Expression::new(
                format!(
                    "{}.{} IN (?)",
                    child.owner_table, child.owner_id_column
                ),
                vec![SqlArg::Expr(Expression::new(subquery, args))],
            );
            scope.combine(membership, combinator);
        }

        scope.absorb(ctx.outer, combinator);
        Ok(())
    }
}
