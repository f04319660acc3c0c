//! Errors surfaced by the editing session.
//!
//! Lower layers keep their own error types ([`DecodeError`], [`EncodeError`],
//! [`ConfigError`]); the session folds them into [`EditError`] so callers
//! only have to match on the categories the user can act on.

use thiserror::Error;

use crate::config::ConfigError;
use crate::decode::DecodeError;
use crate::encode::EncodeError;

/// Result alias used throughout the session API.
pub type Result<T, E = EditError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum EditError {
    /// The request was refused and no state changed.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Decoding or rasterizing failed, usually under memory pressure. The
    /// last committed image is still authoritative.
    #[error("Not enough resources to process the image: {0}")]
    ResourceExhaustion(String),

    /// No file was produced.
    #[error("Encoding failed: {0}")]
    EncodeFailure(String),

    /// A commit is still outstanding.
    #[error("Another edit is still being applied")]
    Busy,

    #[error("No tool is active")]
    NoActiveTool,

    /// `finish_commit` was called with a result no job is waiting for.
    #[error("No commit is pending")]
    NoPendingCommit,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EditError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EditError::InvalidParameters(message.into())
    }
}

impl From<DecodeError> for EditError {
    fn from(err: DecodeError) -> Self {
        EditError::ResourceExhaustion(err.to_string())
    }
}

impl From<EncodeError> for EditError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::InvalidDimensions { .. } => EditError::InvalidParameters(err.to_string()),
            other => EditError::EncodeFailure(other.to_string()),
        }
    }
}
