use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    EmptyIdentifier(&'static str),
    InvalidInterval { start_time: f64, end_time: f64 },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::EmptyIdentifier(kind) => {
                write!(f, "empty {kind} identifier")
            }
            ModelError::InvalidInterval {
                start_time,
                end_time,
            } => write!(
                f,
                "invalid skip interval: start {start_time} must be >= 0 and before end {end_time}"
            ),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
