//! Error types for the AI services

/// AI service error type
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// The API answered with a non-success status
    #[error("OpenAI API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Empty response from OpenAI API")]
    EmptyResponse,

    #[error("Malformed API response: {0}")]
    Malformed(String),

    /// Bad input to a service, surfaced as a client error
    #[error("{message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },
}

/// Result type alias for AI operations
pub type Result<T> = std::result::Result<T, AiError>;

impl AiError {
    pub fn api<S: Into<String>>(status: u16, message: S) -> Self {
        AiError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_input<S: Into<String>>(field: &'static str, message: S) -> Self {
        AiError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Rate limits and server-side failures are worth one more attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, AiError::Api { status, .. } if *status == 429 || *status >= 500)
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AiError::Api { status: 429, .. })
    }
}
