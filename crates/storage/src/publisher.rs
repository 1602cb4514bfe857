//! Output artifact publication.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use relay_core::reference::OutputReference;

use crate::error::StorageError;
use crate::object_store::ObjectStore;

/// Lifetime of presigned download URLs.
pub const PRESIGNED_URL_EXPIRY: Duration = Duration::from_secs(3600);

/// Makes produced files durably available at a job's destination.
pub struct ArtifactPublisher {
    store: Arc<dyn ObjectStore>,
    url_expiry: Duration,
}

impl ArtifactPublisher {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            url_expiry: PRESIGNED_URL_EXPIRY,
        }
    }

    /// Publish `local_path` to `destination` and return its access handle.
    ///
    /// * Remote: uploads to `prefix/basename` (overwriting), leaves the
    ///   local file in place, and returns a presigned GET URL.
    /// * Local directory: creates the directory if needed, moves the file
    ///   into it, and returns the new path.
    pub async fn publish(
        &self,
        local_path: &Path,
        destination: &OutputReference,
    ) -> Result<String, StorageError> {
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::NoFileName(local_path.display().to_string()))?;

        match destination {
            OutputReference::RemoteObject { bucket, .. } => {
                let key = destination
                    .object_key(file_name)
                    .unwrap_or_else(|| file_name.to_string());

                tracing::info!(
                    local_path = %local_path.display(),
                    bucket = %bucket,
                    key = %key,
                    "Uploading output",
                );
                self.store.upload(local_path, bucket, &key).await?;
                self.store
                    .presigned_get_url(bucket, &key, self.url_expiry)
                    .await
            }
            OutputReference::LocalDirectory(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                let out_path: PathBuf = dir.join(file_name);
                tokio::fs::rename(local_path, &out_path).await?;

                tracing::info!(
                    from = %local_path.display(),
                    to = %out_path.display(),
                    "Moved output",
                );
                Ok(out_path.display().to_string())
            }
        }
    }
}
