//! Error types for the history store

use thiserror::Error;

/// Errors that can occur in history store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
