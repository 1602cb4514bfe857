//! Artifact storage for relay jobs.
//!
//! [`resolver::ArtifactResolver`] turns input references into local files
//! and [`publisher::ArtifactPublisher`] makes produced files available at
//! the job's destination. Both reach object storage only through the
//! [`object_store::ObjectStore`] trait; [`s3::S3ObjectStore`] is the
//! production implementation.

pub mod error;
pub mod object_store;
pub mod publisher;
pub mod resolver;
pub mod s3;
