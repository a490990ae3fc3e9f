use thiserror::Error as ThisError;

/// Raised while constructing a leaf. A tree that was built successfully
/// can only fail later on missing candidate data.
#[derive(Debug, ThisError)]
pub enum BuildError {
    #[error("unknown comparator '{name}'; expected one of: is, ne, gt, ge, lt, le, has, in")]
    UnknownComparator { name: String },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Raised while testing a candidate.
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum EvalError {
    #[error("candidate has no field '{field}'")]
    MissingField { field: String },
}

impl EvalError {
    pub(crate) fn missing_field(field: &str) -> Self {
        Self::MissingField {
            field: field.to_owned(),
        }
    }
}
