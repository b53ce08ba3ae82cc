use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{operation} failed: {message}")]
    RemoteCallFailed {
        operation: &'static str,
        message: String,
    },

    #[error("no results found: {0}")]
    NotFound(String),

    #[error("multiple results found, try adjusting search criteria: {0}")]
    AmbiguousResult(String),

    #[error("missing required input: {0}")]
    MissingRequiredInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ApiError {
    /// Wraps an SDK error, keeping the whole source chain in the message
    pub fn remote<E>(operation: &'static str, err: E) -> Self
    where
        E: std::error::Error,
    {
        let message = aws_sdk_route53resolver::error::DisplayErrorContext(&err).to_string();
        tracing::error!(operation, error = %message, "remote call failed");
        ApiError::RemoteCallFailed { operation, message }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
