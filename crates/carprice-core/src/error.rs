//! Error types for the car price estimator

/// Result type alias using the estimator's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for estimator operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A form value could not be converted to its column's numeric type
    #[error("could not convert {value} for '{column}': {reason}")]
    InputConversion {
        column: String,
        value: String,
        reason: String,
    },

    /// A form value was not provided at all
    #[error("no value provided for '{column}'")]
    MissingInput { column: String },

    /// The model artifact is structurally invalid
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// The model rejected the input frame or failed while scoring
    #[error("prediction error: {0}")]
    Prediction(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new input conversion error
    pub fn input_conversion(
        column: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InputConversion {
            column: column.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new missing input error
    pub fn missing_input(column: impl Into<String>) -> Self {
        Self::MissingInput {
            column: column.into(),
        }
    }

    /// Create a new invalid artifact error
    pub fn invalid_artifact(msg: impl Into<String>) -> Self {
        Self::InvalidArtifact(msg.into())
    }

    /// Create a new prediction error
    pub fn prediction(msg: impl Into<String>) -> Self {
        Self::Prediction(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
