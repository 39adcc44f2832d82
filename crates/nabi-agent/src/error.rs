//! Error types for nabi-agent

use thiserror::Error;

/// Result type alias using nabi-agent Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during session operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error from an external service
    #[error(transparent)]
    Service(#[from] nabi_services::Error),

    /// An error raised by the agent runtime
    #[error("agent runtime error: {0}")]
    Runtime(String),

    /// The user submitted an empty query
    #[error("질문을 입력해주세요.")]
    EmptyQuery,

    /// A form was submitted with missing required fields
    #[error("{0}")]
    InvalidForm(String),
}
