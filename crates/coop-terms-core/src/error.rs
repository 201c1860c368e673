use thiserror::Error;

#[derive(Debug, Error)]
pub enum TermsError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl TermsError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        TermsError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for TermsError {
    fn from(e: serde_json::Error) -> Self {
        TermsError::SerializationError(e.to_string())
    }
}
