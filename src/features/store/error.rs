//! # Store Errors
//!
//! Record store error taxonomy.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use std::time::Duration;

/// Errors produced by the record store and its backends.
///
/// The conversation engine maps each variant onto a user-facing reply:
/// `InvalidPosition` and `RowGone` are validation problems, `Conflict` asks
/// the user to retry, everything else is a generic store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend unreachable, I/O failure, or unexpected HTTP status.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Stored object exists but could not be decoded.
    #[error("failed to decode {object}: {reason}")]
    Decode { object: String, reason: String },

    /// The version token submitted with a write no longer matches.
    #[error("write conflict on {object}: concurrent update detected")]
    Conflict { object: String },

    /// A backend call did not finish within the configured bound.
    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),

    /// Row position outside `2..=max_row`.
    #[error("invalid row position {position} (table has {max_row} rows)")]
    InvalidPosition { position: usize, max_row: usize },

    /// The row targeted by a delete disappeared while retrying after a conflict.
    #[error("row {position} no longer exists")]
    RowGone { position: usize },
}

impl StoreError {
    /// True for errors caused by the caller's input rather than the backend.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidPosition { .. } | StoreError::RowGone { .. }
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StoreError::Unavailable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            StoreError::Unavailable("could not connect to the storage server".to_string())
        } else {
            StoreError::Unavailable(format!("HTTP request failed: {e}"))
        }
    }
}
