use thiserror::Error;

/// Engine error taxonomy. Integrity-class failures (empty roll subsets,
/// missing catalog entries) never surface here; the engines fall back
/// deterministically instead.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl GameError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

pub type GameResult<T> = Result<T, GameError>;
