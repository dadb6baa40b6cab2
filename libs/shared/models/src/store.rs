use thiserror::Error;

/// Fault class for the persistence layer. Business-rule failures never use
/// this; it is reserved for store operations that could not run at all, so
/// callers can tell an unavailable backend apart from a rejected request.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store write failed: {0}")]
    WriteFailed(String),
}
