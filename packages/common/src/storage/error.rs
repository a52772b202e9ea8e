/// Errors that can occur during blob storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No object is stored under the requested key.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The object key contains characters the backend does not accept.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// The provided content hash is not a valid SHA-256 hex string.
    #[error("invalid content hash: {0}")]
    InvalidHash(String),

    /// The object exceeds the configured single-object size limit.
    #[error("object exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },

    /// An I/O error occurred.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage backend could not be reached or rejected the request.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}
