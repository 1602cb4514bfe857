//! ComfyUI REST client library.
//!
//! Provides the HTTP API wrapper for workflow submission, history lookup
//! and liveness checks, the [`engine::GenerationEngine`] seam the rest of
//! the service depends on, the completion poller, and the health reporter.

pub mod api;
pub mod engine;
pub mod health;
pub mod poller;
