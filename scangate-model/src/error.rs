use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A mandatory finding field was empty.
    InvalidFinding { id: String, field: &'static str },
    UnknownSeverity(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidFinding { id, field } => {
                if id.is_empty() {
                    write!(f, "invalid finding: `{field}` must not be empty")
                } else {
                    write!(
                        f,
                        "invalid finding {id}: `{field}` must not be empty"
                    )
                }
            }
            ModelError::UnknownSeverity(value) => write!(
                f,
                "unknown severity '{value}' (expected one of: critical, high, medium, low, info)"
            ),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
