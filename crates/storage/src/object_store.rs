//! Object storage abstraction.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageError;

/// Minimal object storage surface needed by the resolver and publisher.
///
/// Implementations must be safe to share between concurrent jobs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download `bucket/key` to `dest`, overwriting any existing file.
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError>;

    /// Upload `src` to `bucket/key`, overwriting any existing object.
    /// The local file is left in place.
    async fn upload(&self, src: &Path, bucket: &str, key: &str) -> Result<(), StorageError>;

    /// Generate a time-limited GET URL for `bucket/key`.
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;
}
