//! Error types for nabi-services

use thiserror::Error;

/// Result type alias using nabi-services Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to external services
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service returned an error response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Google account authentication is missing or expired
    #[error("Google 계정 인증이 필요합니다: {0}")]
    Auth(String),

    /// A required environment variable is not set
    #[error("환경 변수가 설정되지 않았습니다: {0}")]
    MissingEnv(&'static str),

    /// User-supplied input failed validation
    #[error("{0}")]
    InvalidInput(String),

    /// The service responded with an unexpected shape
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Create an API error from a status code and body text
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}
