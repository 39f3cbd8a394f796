//! Error types for Conveyor.

use thiserror::Error;

/// Errors raised by the resource runtime.
///
/// `Clone` is required so a failure can be shared by every consumer of a
/// deferred value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A field the creation path requires was not supplied.
    #[error("missing required property '{0}'")]
    MissingRequiredField(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("engine error: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
