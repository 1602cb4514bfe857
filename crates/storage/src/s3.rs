//! Amazon S3 implementation of [`ObjectStore`].

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use tokio::io::AsyncWriteExt;

use crate::error::StorageError;
use crate::object_store::ObjectStore;

/// S3-backed object store. Cheap to clone; the SDK client is shared.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

fn transport<E: std::error::Error>(err: E) -> StorageError {
    StorageError::Transport(DisplayErrorContext(err).to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError> {
        let object = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::ObjectNotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    transport(e)
                }
            })?;

        let mut body = object.body;
        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = body.try_next().await.map_err(transport)? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(())
    }

    async fn upload(&self, src: &Path, bucket: &str, key: &str) -> Result<(), StorageError> {
        let body = ByteStream::from_path(src).await.map_err(transport)?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(transport)?;

        Ok(())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(transport)?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(transport)?;

        Ok(request.uri().to_string())
    }
}
