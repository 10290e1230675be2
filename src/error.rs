//! Error types for the store and its bindings.

use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No store provided to this context")]
    MissingProvider,
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
