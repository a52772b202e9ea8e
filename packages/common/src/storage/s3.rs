use std::io::Cursor;

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};

use super::error::StorageError;
use super::hash::ContentHash;
use super::traits::{BlobStore, BoxReader, PutMeta};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// S3-compatible keyed blob store (AWS S3, MinIO).
///
/// One bucket holds all objects; the object key is the asset id. Uses
/// path-style addressing so MinIO works without virtual-host DNS setup.
pub struct S3BlobStore {
    bucket: Box<Bucket>,
}

impl S3BlobStore {
    pub fn new(
        endpoint: &str,
        region: &str,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: region.to_owned(),
            endpoint: endpoint.to_owned(),
        };
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StorageError::Unavailable(format!("bad credentials: {e}")))?;
        let bucket = Bucket::new(bucket, region, credentials)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
            .with_path_style();

        Ok(Self { bucket })
    }

    fn map_err(key: &str, err: S3Error) -> StorageError {
        match err {
            S3Error::HttpFailWithBody(404, _) => StorageError::NotFound(key.to_string()),
            other => StorageError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        key: &str,
        data: &[u8],
        meta: &PutMeta,
    ) -> Result<ContentHash, StorageError> {
        let hash = ContentHash::compute(data);
        let content_type = meta.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

        let response = self
            .bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| Self::map_err(key, e))?;

        if response.status_code() / 100 != 2 {
            return Err(StorageError::Unavailable(format!(
                "put returned HTTP {}",
                response.status_code()
            )));
        }

        tracing::debug!(key, owner = ?meta.owner, size = data.len(), "stored object");
        Ok(hash)
    }

    async fn get_stream(&self, key: &str) -> Result<BoxReader, StorageError> {
        // Buffered rather than streamed; image objects are bounded by the
        // single-object size limit.
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| Self::map_err(key, e))?;

        Ok(Box::new(Cursor::new(response.bytes().to_vec())))
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self.bucket.head_object(key).await {
            Ok((_, code)) if code / 100 == 2 => Ok(true),
            Ok(_) => Ok(false),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(StorageError::Unavailable(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        match self.bucket.delete_object(key).await {
            Ok(_) => Ok(true),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(StorageError::Unavailable(e.to_string())),
        }
    }

    async fn size(&self, key: &str) -> Result<u64, StorageError> {
        let (head, code) = self
            .bucket
            .head_object(key)
            .await
            .map_err(|e| Self::map_err(key, e))?;

        if code == 404 {
            return Err(StorageError::NotFound(key.to_string()));
        }

        head.content_length
            .map(|len| len as u64)
            .ok_or_else(|| StorageError::Unavailable("missing content length".into()))
    }
}
