//! Error types for Nutri Engine

use thiserror::Error;

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

/// Input validation failures raised by the metric calculator and the
/// measurement normalizer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("{field} is not a number: {raw:?}")]
    NotANumber { field: &'static str, raw: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    #[error("Unknown activity level: {0}")]
    UnknownActivityLevel(String),

    #[error("Unknown goal: {0}")]
    UnknownGoal(String),

    #[error("Unknown gender: {0}")]
    UnknownGender(String),

    #[error("Unknown macro field: {0}")]
    UnknownMacro(String),

    #[error("Measurement history must be sorted newest first (entry {index} is newer than its predecessor)")]
    UnsortedHistory { index: usize },

    #[error("Macro split must hold values in 0..=100 totalling 100, got total {sum}")]
    InvalidSplit { sum: i64 },
}

impl ValidationError {
    /// Check that a value is finite and strictly positive
    pub fn check_positive(field: &'static str, value: f64) -> std::result::Result<f64, Self> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite { field });
        }
        if value <= 0.0 {
            return Err(ValidationError::NonPositive { field, value });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_positive() {
        assert_eq!(ValidationError::check_positive("weight", 70.0), Ok(70.0));
        assert_eq!(
            ValidationError::check_positive("weight", 0.0),
            Err(ValidationError::NonPositive {
                field: "weight",
                value: 0.0
            })
        );
        assert_eq!(
            ValidationError::check_positive("height", f64::NAN),
            Err(ValidationError::NonFinite { field: "height" })
        );
        assert_eq!(
            ValidationError::check_positive("height", f64::INFINITY),
            Err(ValidationError::NonFinite { field: "height" })
        );
    }

    #[test]
    fn test_validation_wraps_into_engine_error() {
        let err: EngineError = ValidationError::UnknownGoal("bulk".to_string()).into();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(err.to_string(), "Validation error: Unknown goal: bulk");
    }
}
