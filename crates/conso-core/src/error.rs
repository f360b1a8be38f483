use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsolidationError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid period '{0}': expected YYYYMM")]
    InvalidPeriod(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ConsolidationError {
    fn from(e: serde_json::Error) -> Self {
        ConsolidationError::SerializationError(e.to_string())
    }
}
