//! Sort criteria compilation into `ORDER BY` fragments.

use serde_json::Value;
use tracing::debug;

use crate::criteria::QueryCriteria;
use crate::error::{FilterError, FilterResult};
use crate::registry::{self, TableLookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn from_token(token: &str) -> SortOrder {
        match token.to_lowercase().as_str() {
            "desc" | "descending" => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SortSpec {
    pub attribute: String,
    pub order: SortOrder,
}

impl SortSpec {
    /// Parse an `"attribute"` / `"attribute DESC"` specification string.
    pub fn parse(spec: &str) -> Option<SortSpec> {
        let mut parts = spec.split_whitespace();
        let attribute = parts.next()?.to_string();
        let order = parts
            .next()
            .map(SortOrder::from_token)
            .unwrap_or(SortOrder::Ascending);
        Some(SortSpec { attribute, order })
    }
}

/// Compile `criteria.sort` into `table.column ASC|DESC` fragments.
///
/// Accepts a single specification string or an array of them; non-string
/// array elements are skipped. Attributes must be allow-listed and known to
/// the registry; anything else fails with the same error class as a filter
/// leaf.
pub fn compile_sort(
    allowed_attributes: &[&str],
    criteria: &QueryCriteria,
    overwrite_tables: Option<&TableLookup>,
) -> FilterResult<Vec<String>> {
    let sort = match &criteria.sort {
        Some(value) => value,
        None => return Ok(Vec::new()),
    };

    let specs: Vec<&str> = match sort {
        Value::String(spec) => vec![spec.as_str()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let spec = item.as_str();
                if spec.is_none() {
                    debug!("ignoring non-string sort specification: {}", item);
                }
                spec
            })
            .collect(),
        other => {
            debug!("ignoring unsupported sort criteria: {}", other);
            return Ok(Vec::new());
        }
    };

    let mut fragments = Vec::with_capacity(specs.len());
    for spec in specs {
        let parsed = match SortSpec::parse(spec) {
            Some(parsed) => parsed,
            None => continue,
        };
        if !allowed_attributes
            .iter()
            .any(|allowed| *allowed == parsed.attribute)
        {
            return Err(FilterError::IllegalAttributeOrOperator(parsed.attribute));
        }
        let (table, column) = registry::table_of_field(&parsed.attribute, overwrite_tables)?;
        fragments.push(format!("{}.{} {}", table, column, parsed.order.as_sql()));
    }
    Ok(fragments)
}
