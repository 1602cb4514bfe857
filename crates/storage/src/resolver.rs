//! Input artifact resolution.

use std::path::PathBuf;
use std::sync::Arc;

use relay_core::reference::InputReference;

use crate::error::StorageError;
use crate::object_store::ObjectStore;

/// Maps input references to local files, fetching remote objects into a
/// staging directory shared by all jobs.
///
/// Each call makes a single attempt; failures are returned to the caller.
pub struct ArtifactResolver {
    store: Arc<dyn ObjectStore>,
    staging_dir: PathBuf,
}

impl ArtifactResolver {
    pub fn new(store: Arc<dyn ObjectStore>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            staging_dir: staging_dir.into(),
        }
    }

    /// Resolve `reference` to a local file path.
    ///
    /// Remote objects are downloaded to `<staging_dir>/<basename(key)>`;
    /// local paths are returned unchanged once confirmed to exist.
    pub async fn resolve(&self, reference: &InputReference) -> Result<PathBuf, StorageError> {
        match reference {
            InputReference::RemoteObject { bucket, key } => {
                let file_name = reference
                    .basename()
                    .ok_or_else(|| StorageError::NoFileName(format!("s3://{bucket}/{key}")))?;
                let local_path = self.staging_dir.join(file_name);

                tokio::fs::create_dir_all(&self.staging_dir).await?;

                tracing::info!(
                    bucket = %bucket,
                    key = %key,
                    local_path = %local_path.display(),
                    "Downloading input",
                );
                self.store.download(bucket, key, &local_path).await?;
                Ok(local_path)
            }
            InputReference::LocalPath(path) => {
                if !tokio::fs::try_exists(path).await? {
                    return Err(StorageError::FileNotFound(path.clone()));
                }
                Ok(path.clone())
            }
        }
    }
}
