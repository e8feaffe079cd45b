//! Translator for attributes stored as plain columns on an entity table.

use serde_json::Value;
use tracing::debug;

use super::{OperatorFn, TranslationContext, Translator, WalkEnv};
use crate::error::FilterResult;
use crate::expression;
use crate::registry;

#[derive(Debug)]
pub(crate) struct RelationalTranslator;

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
];

pub(super) fn op_eq(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let expr = expression::equals(&ctx.table, &ctx.column, value, None, &[]);
    ctx.push(expr);
    Ok(())
}

pub(super) fn op_neq(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let expr = expression::not_equals(&ctx.table, &ctx.column, value, None, &[]);
    ctx.push(expr);
    Ok(())
}

pub(super) fn op_like(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let expr = expression::like(&ctx.table, &ctx.column, value, None, &[]);
    ctx.push(expr);
    Ok(())
}

pub(super) fn op_nlike(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let expr = expression::not_like(&ctx.table, &ctx.column, value, None, &[]);
    ctx.push(expr);
    Ok(())
}

pub(super) fn op_gt(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let expr = expression::greater_than(&ctx.table, &ctx.column, value, None, &[]);
    ctx.push(expr);
    Ok(())
}

pub(super) fn op_gte(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let expr = expression::greater_than_equal(&ctx.table, &ctx.column, value, None, &[]);
    ctx.push(expr);
    Ok(())
}

pub(super) fn op_lt(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let expr = expression::lower_than(&ctx.table, &ctx.column, value, None, &[]);
    ctx.push(expr);
    Ok(())
}

pub(super) fn op_lte(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let expr = expression::lower_than_equal(&ctx.table, &ctx.column, value, None, &[]);
    ctx.push(expr);
    Ok(())
}

pub(super) fn op_in(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let expr = expression::in_values(&ctx.table, &ctx.column, value, None, &[]);
    ctx.push(expr);
    Ok(())
}

pub(super) fn op_nin(ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
    let expr = expression::not_in_values(&ctx.table, &ctx.column, value, None, &[]);
    ctx.push(expr);
    Ok(())
}

impl Translator for RelationalTranslator {
    fn name(&self) -> &'static str {
        "relational"
    }

    fn resolve(&self, ctx: &mut TranslationContext, env: &WalkEnv) -> FilterResult<()> {
        let (table, column) = registry::table_of_field(ctx.attribute, env.overwrite)?;
        ctx.table = table;
        ctx.column = column;
        Ok(())
    }

    fn operators(&self) -> &'static [(&'static str, OperatorFn)] {
        OPERATORS
    }

    fn apply_shorthand(&self, ctx: &mut TranslationContext, value: &Value) -> FilterResult<()> {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => op_eq(ctx, value),
            Value::Array(_) => op_in(ctx, value),
            _ => {
                debug!(
                    "ignoring unsupported criteria shorthand for attribute '{}'",
                    ctx.attribute
                );
                Ok(())
            }
        }
    }
}
