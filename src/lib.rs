//! filterql — compiles nested JSON-like criteria filters into parameterized
//! SQL predicate trees.
//!
//! The caller hands [`apply_criteria_filter`] a mutable [`Scope`], an
//! allow-list of attribute names and a [`QueryCriteria`] envelope; the
//! compiled predicate lands in the scope, ready to attach to a `WHERE`
//! clause. Attributes resolve to one of three translation strategies: plain
//! columns, membership join-table attributes with count-based set semantics,
//! or the JSON document column with path addressing.

pub mod criteria;
pub mod error;
pub mod expression;
pub mod registry;
pub mod sort;
pub mod walker;

mod translate;

// Re-export commonly used types for easier access
pub use criteria::QueryCriteria;
pub use error::{FilterError, FilterResult};
pub use expression::{Combinator, Expression, Scope, SqlArg};
pub use sort::{compile_sort, SortOrder, SortSpec};
pub use walker::apply_criteria_filter;
