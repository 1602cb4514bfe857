//! Storage reference parsing.
//!
//! A reference is either `s3://bucket/key...` (remote object storage) or
//! any other string, which is taken as a local filesystem path.

use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// URI scheme marking a remote object reference.
pub const S3_SCHEME: &str = "s3://";

/// Where a job input lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputReference {
    RemoteObject { bucket: String, key: String },
    LocalPath(PathBuf),
}

/// Where a job's produced artifacts are published to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputReference {
    /// `prefix` is empty when artifacts land at the bucket root.
    RemoteObject { bucket: String, prefix: String },
    LocalDirectory(PathBuf),
}

impl InputReference {
    /// Parse an input reference.
    ///
    /// A remote reference must name a bucket and a key that ends in a
    /// file name. The key may itself contain `/` separators.
    pub fn parse(uri: &str) -> Result<Self, CoreError> {
        let Some(rest) = uri.strip_prefix(S3_SCHEME) else {
            return Ok(Self::LocalPath(PathBuf::from(uri)));
        };

        let parsed = match rest.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Self::RemoteObject {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => return Err(CoreError::Validation(format!("Invalid S3 URI format: {uri}"))),
        };

        // Staging names the local copy after the key's basename.
        if parsed.basename().is_none() {
            return Err(CoreError::Validation(format!("S3 key has no file name: {uri}")));
        }
        Ok(parsed)
    }

    /// File name the reference resolves to locally.
    ///
    /// Remote objects are staged under the basename of their key, so the
    /// same key always yields the same local name.
    pub fn basename(&self) -> Option<&str> {
        match self {
            Self::RemoteObject { key, .. } => Path::new(key).file_name()?.to_str(),
            Self::LocalPath(path) => path.file_name()?.to_str(),
        }
    }
}

impl OutputReference {
    pub fn parse(uri: &str) -> Result<Self, CoreError> {
        let Some(rest) = uri.strip_prefix(S3_SCHEME) else {
            return Ok(Self::LocalDirectory(PathBuf::from(uri)));
        };

        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(CoreError::Validation(format!("Invalid S3 URI format: {uri}")));
        }

        Ok(Self::RemoteObject {
            bucket: bucket.to_string(),
            prefix: prefix.trim_end_matches('/').to_string(),
        })
    }

    /// Object key for a file published under this destination.
    ///
    /// Returns `None` for local directories.
    pub fn object_key(&self, file_name: &str) -> Option<String> {
        match self {
            Self::RemoteObject { prefix, .. } if prefix.is_empty() => Some(file_name.to_string()),
            Self::RemoteObject { prefix, .. } => Some(format!("{prefix}/{file_name}")),
            Self::LocalDirectory(_) => None,
        }
    }
}
