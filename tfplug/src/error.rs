//! Error types for tfplug

/// Error type for tfplug operations
#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("Provider data was not configured; the provider must be configured before {0}")]
    ProviderNotConfigured(String),

    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid attribute path: {0}")]
    InvalidPath(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// Result type alias for tfplug operations
pub type Result<T> = std::result::Result<T, TfplugError>;

impl TfplugError {
    /// Missing attributes read as null in Terraform, so callers reading
    /// optional values treat this variant as "not set".
    pub fn is_not_found(&self) -> bool {
        matches!(self, TfplugError::AttributeNotFound(_))
    }
}
