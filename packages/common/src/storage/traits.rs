use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use uuid::Uuid;

use super::error::StorageError;
use super::hash::ContentHash;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Out-of-band metadata attached to a stored object.
#[derive(Debug, Clone, Default)]
pub struct PutMeta {
    /// MIME content type of the stored bytes.
    pub content_type: Option<String>,
    /// Owning user, for audit purposes only. Authorization never reads this.
    pub owner: Option<Uuid>,
}

/// Keyed blob storage.
///
/// Objects are addressed by a caller-chosen key (the asset id); the content
/// identity of the stored bytes is computed on write and returned to the
/// caller, which records it alongside the key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `key` and return the content hash of the data.
    async fn put(&self, key: &str, data: &[u8], meta: &PutMeta)
    -> Result<ContentHash, StorageError>;

    /// Retrieve all bytes stored under `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.get_stream(key).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve the object under `key` as a streaming async reader.
    async fn get_stream(&self, key: &str) -> Result<BoxReader, StorageError>;

    /// Check whether an object exists under `key`.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Delete the object under `key`.
    ///
    /// Returns `true` if an object was deleted, `false` if none existed.
    /// Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Get the size of the object under `key` in bytes.
    async fn size(&self, key: &str) -> Result<u64, StorageError>;
}
