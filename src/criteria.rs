//! Criteria shapes: the envelope passed by callers and the per-leaf tagged
//! classification of an attribute's criteria value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Criteria envelope accepted by the entry points.
///
/// `filter` is the nested filter tree; `sort` is a sort specification string
/// or array of them. Both are optional, and unknown members are ignored so
/// the envelope can be deserialized straight from caller-supplied JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Value>,
}

impl QueryCriteria {
    pub fn with_filter(filter: Value) -> Self {
        QueryCriteria {
            filter: Some(filter),
            sort: None,
        }
    }
}

/// Shape of a leaf's criteria value, decided once per leaf.
///
/// An object counts as an operator map only when it is non-empty and every
/// key starts with `$`; any other object is `Unsupported` and left to the
/// translator's shorthand handling (document values accept it, relational
/// attributes skip it).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Criteria<'a> {
    /// string / number / boolean / null
    Scalar(&'a Value),
    Array(&'a [Value]),
    Operators(&'a Map<String, Value>),
    Unsupported(&'a Value),
}

impl<'a> Criteria<'a> {
    pub fn of(value: &'a Value) -> Criteria<'a> {
        match value {
            Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
                Criteria::Scalar(value)
            }
            Value::Array(items) => Criteria::Array(items),
            Value::Object(map) => {
                if !map.is_empty() && map.keys().all(|key| key.starts_with('$')) {
                    Criteria::Operators(map)
                } else {
                    Criteria::Unsupported(value)
                }
            }
        }
    }
}
