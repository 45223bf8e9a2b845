use crate::failure::WrappedFailure;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("parse error: {reason}")]
    Parse { reason: String },

    #[error("config error: {reason}")]
    Config { reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure surfaced by a response-write continuation.
///
/// Only [`WriteError::Wrapped`] is inspected by the guard. Anything the host
/// did not wrap travels as [`WriteError::Unwrapped`] and is handed back to the
/// caller untouched.
#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    #[error("write failed: {0}")]
    Wrapped(#[from] WrappedFailure),

    #[error("{0}")]
    Unwrapped(Box<dyn std::error::Error + Send + Sync>),
}

impl WriteError {
    pub fn unwrapped(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Unwrapped(err.into())
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, Self::Wrapped(_))
    }
}
