//! Translation strategies: per-attribute-kind compilation of criteria into
//! expressions.
//!
//! A [`Translator`] binds a table-resolution rule, an operator table (data,
//! not code), shorthand dispatch, and a finalize hook that folds the leaf's
//! accumulated expressions back into the caller's scope. The classifier
//! selects the strategy from the attribute name alone.

pub(crate) mod child;
pub(crate) mod document;
pub(crate) mod relational;

use serde_json::Value;

use crate::criteria::Criteria;
use crate::error::{FilterError, FilterResult};
use crate::expression::{Combinator, Expression, Scope};
use crate::registry::{self, ChildAttribute, TableLookup};

/// Environment shared across one compilation run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WalkEnv<'a> {
    pub allowed: &'a [&'a str],
    pub overwrite: Option<&'a TableLookup>,
}

/// Per-leaf mutable state threaded through a translator's steps. Created
/// fresh per leaf and consumed by `finalize`.
pub(crate) struct TranslationContext<'a> {
    pub attribute: &'a str,
    pub combinator: Combinator,
    pub table: String,
    pub column: String,
    /// Accumulates this leaf's WHERE expressions.
    pub scope: Scope,
    /// Accumulates HAVING refinements (child attributes only).
    pub having: Scope,
    /// Complete predicates that bypass subquery wrapping and fold into the
    /// caller's scope as-is.
    pub outer: Scope,
    /// Resolved JSON path (document attributes only).
    pub path: Option<String>,
    /// Join-table descriptor (child attributes only).
    pub child: Option<&'static ChildAttribute>,
}

impl<'a> TranslationContext<'a> {
    fn new(attribute: &'a str, combinator: Combinator) -> Self {
        TranslationContext {
            attribute,
            combinator,
            table: String::new(),
            column: String::new(),
            scope: Scope::new(),
            having: Scope::new(),
            outer: Scope::new(),
            path: None,
            child: None,
        }
    }

    /// Combine an expression into the active scope with the ambient type.
    pub fn push(&mut self, expr: Expression) {
        let combinator = self.combinator;
        self.scope.combine(expr, combinator);
    }

    pub fn push_having(&mut self, expr: Expression) {
        let combinator = self.combinator;
        self.having.combine(expr, combinator);
    }

    pub fn push_outer(&mut self, expr: Expression) {
        let combinator = self.combinator;
        self.outer.combine(expr, combinator);
    }
}

pub(crate) type OperatorFn = fn(&mut TranslationContext, &Value) -> FilterResult<()>;

/// A translation strategy for one attribute storage shape.
pub(crate) trait Translator: Sync + std::fmt::Debug {
    /// Name used in unknown-operator messages.
    fn name(&self) -> &'static str;

    /// Resolve the owning table and target column into the context.
    fn resolve(&self, ctx: &mut TranslationContext, env: &WalkEnv) -> FilterResult<()>;

    /// Operator table: operator name -> handler.
    fn operators(&self) -> &'static [(&'static str, OperatorFn)];

    /// Applied when the criteria is not an operator map.
    fn apply_shorthand(&self, ctx: &mut TranslationContext, value: &Value) -> FilterResult<()>;

    /// Fold the accumulated expressions back into the caller's scope.
    fn finalize(&self, ctx: TranslationContext, scope: &mut Scope) -> FilterResult<()> {
        let combinator = ctx.combinator;
        scope.absorb(ctx.scope, combinator);
        scope.absorb(ctx.outer, combinator);
        Ok(())
    }
}

/// Select the translator for an attribute name: fixed child-attribute names
/// first, then the reserved document prefix, then the allow-list. A name
/// matching none of them fails identically whether it looks like a malformed
/// combinator or a disallowed attribute.
pub(crate) fn classify(
    attribute: &str,
    env: &WalkEnv,
) -> FilterResult<&'static dyn Translator> {
    if registry::child_attribute(attribute).is_some() {
        return Ok(&child::ChildAttributeTranslator);
    }
    if attribute.starts_with(registry::DOCUMENT_ATTRIBUTE) {
        return Ok(&document::DocumentTranslator);
    }
    if env.allowed.iter().any(|allowed| *allowed == attribute) {
        return Ok(&relational::RelationalTranslator);
    }
    Err(FilterError::IllegalAttributeOrOperator(attribute.to_string()))
}

/// Drive one leaf through its translator.
pub(crate) fn translate_leaf(
    attribute: &str,
    value: &Value,
    env: &WalkEnv,
    scope: &mut Scope,
    combinator: Combinator,
) -> FilterResult<()> {
    let translator = classify(attribute, env)?;
    let mut ctx = TranslationContext::new(attribute, combinator);
    translator.resolve(&mut ctx, env)?;

    match Criteria::of(value) {
        Criteria::Operators(map) => {
            for (name, operand) in map {
                let handler = translator
                    .operators()
                    .iter()
                    .find(|(op, _)| *op == name.as_str())
                    .map(|(_, handler)| handler)
                    .ok_or_else(|| FilterError::UnknownOperator {
                        operator: name.clone(),
                        translator: translator.name(),
                    })?;
                handler(&mut ctx, operand)?;
            }
        }
        _ => translator.apply_shorthand(&mut ctx, value)?,
    }

    translator.finalize(ctx, scope)
}
