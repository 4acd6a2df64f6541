//! Notification error types.

use std::path::PathBuf;
use thiserror::Error;

pub type NotifyResult<T> = Result<T, NotifyError>;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Missing message field: {0}")]
    MissingField(&'static str),

    #[error("Attachment not found: {0}")]
    AttachmentNotFound(PathBuf),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Message build failed: {0}")]
    Build(String),

    #[error("Transport failed: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotifyError {
    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::InvalidAddress(message.into())
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Whether sending the same message again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NotifyError::Transport(_) | NotifyError::Io(_))
    }
}
