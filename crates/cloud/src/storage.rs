//! Object store access.
//!
//! Transfers stream between the local file and the bucket; object bodies
//! are never buffered whole in memory.

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use tokio::io::{AsyncBufRead, AsyncWriteExt};

use crate::error::CloudError;

/// Bucket/key blob storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download `bucket/key` into the file at `dest`, returning the byte count.
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, CloudError>;

    /// Upload the file at `src` to `bucket/key`, returning the byte count.
    async fn upload(&self, src: &Path, bucket: &str, key: &str) -> Result<u64, CloudError>;
}

// ---------------------------------------------------------------------------
// S3ObjectStore
// ---------------------------------------------------------------------------

/// [`ObjectStore`] backed by Amazon S3.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, CloudError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    CloudError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    CloudError::ObjectStore(DisplayErrorContext(&e).to_string())
                }
            })?;

        let reader = output.body.into_async_read();
        tokio::pin!(reader);
        let bytes = stream_to_file(&mut reader, dest).await?;

        tracing::debug!(bucket, key, bytes, dest = %dest.display(), "Object downloaded");
        Ok(bytes)
    }

    async fn upload(&self, src: &Path, bucket: &str, key: &str) -> Result<u64, CloudError> {
        let len = tokio::fs::metadata(src).await?.len();
        let body = ByteStream::from_path(src)
            .await
            .map_err(|e| CloudError::ObjectStore(format!("opening {}: {e}", src.display())))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(len as i64)
            .body(body)
            .send()
            .await
            .map_err(|e| CloudError::ObjectStore(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(bucket, key, bytes = len, "Object uploaded");
        Ok(len)
    }
}

/// Copy a buffered reader into a newly created file at `dest`,
/// returning the number of bytes written.
pub async fn stream_to_file<R>(reader: &mut R, dest: &Path) -> std::io::Result<u64>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut file = tokio::fs::File::create(dest).await?;
    let bytes = tokio::io::copy_buf(reader, &mut file).await?;
    file.flush().await?;
    Ok(bytes)
}
