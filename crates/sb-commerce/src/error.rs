//! Commerce gateway and handler error types.

use thiserror::Error;

/// Errors raised while talking to the store or executing an operation.
#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// An entity named by the user does not exist in the store.
    #[error("{item} not found")]
    NotFound { item: String },

    /// The store rejected the credentials (401/403), or a file lies
    /// outside the upload directory.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not a supported image: {0}")]
    UnsupportedImage(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("gateway not configured: {0}")]
    Config(String),
}

impl CommerceError {
    pub fn not_found(item: impl Into<String>) -> Self {
        Self::NotFound { item: item.into() }
    }
}

/// Convenience alias for commerce results.
pub type CommerceResult<T> = Result<T, CommerceError>;
