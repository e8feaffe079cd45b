use std::fmt;

#[derive(Debug)]
pub enum FilterError {
    /// An object key that is neither a recognized logical operator nor an
    /// allowed or special attribute. The message deliberately does not say
    /// which of the two cases occurred.
    IllegalAttributeOrOperator(String),
    /// An operator key that is not registered for the attribute's translator.
    UnknownOperator {
        operator: String,
        translator: &'static str,
    },
    /// A document attribute suffix that is not a valid path.
    InvalidPathPrefix {
        attribute: String,
        suffix: String,
    },
    Serialization(serde_json::Error),
    Internal(String),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::IllegalAttributeOrOperator(key) => {
                write!(f, "illegal attribute or unknown logical operator: '{}'", key)
            }
            FilterError::UnknownOperator {
                operator,
                translator,
            } => {
                write!(
                    f,
                    "unknown operator '{}' for {} attribute",
                    operator, translator
                )
            }
            FilterError::InvalidPathPrefix { attribute, suffix } => {
                write!(
                    f,
                    "invalid document path suffix '{}' in attribute '{}': expected a suffix starting with '.' or '['",
                    suffix, attribute
                )
            }
            FilterError::Serialization(e) => write!(f, "serialization error: {}", e),
            FilterError::Internal(e) => write!(f, "internal error: {}", e),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilterError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::Serialization(err)
    }
}

pub type FilterResult<T> = Result<T, FilterError>;
