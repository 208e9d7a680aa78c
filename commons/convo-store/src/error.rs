use thiserror::Error;

use crate::types::SequenceToken;

/// Errors surfaced by the document store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,
    #[error("revision conflict")]
    Conflict,
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn serialization<T: ToString>(msg: T) -> Self {
        Self::Serialization(msg.to_string())
    }

    pub fn backend<T: ToString>(msg: T) -> Self {
        Self::Backend(msg.to_string())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a change feed subscription.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Clean disconnect. The feed may report the last sequence it
    /// delivered so the caller can resume from there.
    #[error("feed disconnected")]
    Disconnected { last_seq: Option<SequenceToken> },
    #[error("feed error: {0}")]
    Backend(String),
}

impl FeedError {
    pub fn backend<T: ToString>(msg: T) -> Self {
        Self::Backend(msg.to_string())
    }

    /// Whether this error is a clean disconnect that the reader
    /// recovers from by resubscribing.
    pub fn is_benign(&self) -> bool {
        matches!(self, FeedError::Disconnected { .. })
    }
}
