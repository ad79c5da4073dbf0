//! Error types for the note store and its callers.
//!
//! [`StoreError`] is the storage-failure family: anything that stopped a
//! backend read or write from completing. [`ValidationError`] is raised
//! before the store is ever called. [`EventError`] joins the two for the
//! event surface.

use thiserror::Error;

/// The backend read or write did not complete.
///
/// A failed operation leaves the persisted collection at its previous value;
/// the store never retries.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("LMDB backend error: {0}")]
    Backend(#[from] lmdb::Error),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("persisted record under key '{key}' could not be decoded: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode note collection: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("backend task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("backend unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Input rejected before it reaches the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("note text is empty")]
    EmptyText,

    #[error("note text too long: {length} characters, max {max}")]
    TextTooLong { length: usize, max: usize },

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failure of a collaborator event.
#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
