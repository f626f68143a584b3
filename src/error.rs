//! Error types for Narx operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for Narx operations.
///
/// Distinguishes the three failure classes of the appraisal engine:
/// configuration errors (bad or inconsistent model artifacts, fatal at
/// construction), precondition violations (input outside the validated
/// contract) and inference failures (a fitted model could not produce a
/// prediction for this request).
///
/// # Examples
///
/// ```
/// use narx::error::NarxError;
///
/// let err = NarxError::ArtifactInvalid {
///     component: "neighbor_index".to_string(),
///     message: "historical target array is empty".to_string(),
/// };
/// assert!(err.to_string().contains("neighbor_index"));
/// ```
#[derive(Debug)]
pub enum NarxError {
    /// A fitted model artifact is missing, malformed or internally
    /// inconsistent. Fatal at engine construction.
    ArtifactInvalid {
        /// Artifact name (e.g. "forest", "neighbor_index")
        component: String,
        /// Problem description
        message: String,
    },

    /// Row/column shapes don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid parameter value provided.
    InvalidParameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Input failed the inbound precondition contract.
    PreconditionViolation {
        /// Field name
        field: String,
        /// Constraint that was violated
        message: String,
    },

    /// A fitted model raised during prediction. Aborts the whole request.
    Inference {
        /// Model name (e.g. "gradient_boosting")
        model: String,
        /// Problem description
        message: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for NarxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarxError::ArtifactInvalid { component, message } => {
                write!(f, "Invalid model artifact `{component}`: {message}")
            }
            NarxError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            NarxError::InvalidParameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid parameter: {param} = {value}, expected {constraint}"
                )
            }
            NarxError::PreconditionViolation { field, message } => {
                write!(f, "Precondition violated for `{field}`: {message}")
            }
            NarxError::Inference { model, message } => {
                write!(f, "Inference failed in `{model}`: {message}")
            }
            NarxError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for NarxError {}

impl From<&str> for NarxError {
    fn from(msg: &str) -> Self {
        NarxError::Other(msg.to_string())
    }
}

impl From<String> for NarxError {
    fn from(msg: String) -> Self {
        NarxError::Other(msg)
    }
}

impl NarxError {
    /// Create an artifact error with component context.
    #[must_use]
    pub fn artifact(component: &str, message: impl Into<String>) -> Self {
        Self::ArtifactInvalid {
            component: component.to_string(),
            message: message.into(),
        }
    }

    /// Create an inference error with model context.
    #[must_use]
    pub fn inference(model: &str, message: impl Into<String>) -> Self {
        Self::Inference {
            model: model.to_string(),
            message: message.into(),
        }
    }

    /// Create an empty input error.
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::Other(format!("empty input: {context}"))
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, NarxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_invalid_display() {
        let err = NarxError::artifact("forest", "zero trees");
        let msg = err.to_string();
        assert!(msg.contains("forest"));
        assert!(msg.contains("zero trees"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = NarxError::DimensionMismatch {
            expected: "11 columns".to_string(),
            actual: "10 columns".to_string(),
        };
        assert!(err.to_string().contains("Dimension mismatch"));
        assert!(err.to_string().contains("11 columns"));
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = NarxError::InvalidParameter {
            param: "p".to_string(),
            value: "120".to_string(),
            constraint: "0..=100".to_string(),
        };
        assert!(err.to_string().contains("Invalid parameter"));
        assert!(err.to_string().contains("0..=100"));
    }

    #[test]
    fn test_precondition_violation_display() {
        let err = NarxError::PreconditionViolation {
            field: "room_count".to_string(),
            message: "must be in 1..=20".to_string(),
        };
        assert!(err.to_string().contains("room_count"));
        assert!(err.to_string().contains("1..=20"));
    }

    #[test]
    fn test_inference_display() {
        let err = NarxError::inference("random_forest", "encoded row too short");
        let msg = err.to_string();
        assert!(msg.contains("random_forest"));
        assert!(msg.contains("encoded row"));
    }

    #[test]
    fn test_from_str() {
        let err: NarxError = "test error".into();
        assert!(matches!(err, NarxError::Other(_)));
        assert_eq!(err.to_string(), "test error");
    }

    #[test]
    fn test_from_string() {
        let err: NarxError = "test error".to_string().into();
        assert!(matches!(err, NarxError::Other(_)));
    }

    #[test]
    fn test_empty_input_helper() {
        let err = NarxError::empty_input("neighbor targets");
        assert!(err.to_string().contains("empty input"));
        assert!(err.to_string().contains("neighbor targets"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NarxError>();
    }
}
