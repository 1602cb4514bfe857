//! Abstraction over the generation engine.
//!
//! The orchestrator, poller and health reporter only talk to the engine
//! through [`GenerationEngine`], so tests can substitute an in-process fake
//! for [`ComfyUIApi`](crate::api::ComfyUIApi).

use async_trait::async_trait;

use crate::api::ComfyUIApiError;

#[async_trait]
pub trait GenerationEngine: Send + Sync {
    /// Queue a workflow document and return its prompt id.
    async fn submit(&self, workflow: &serde_json::Value) -> Result<String, ComfyUIApiError>;

    /// Fetch the history record for a prompt.
    ///
    /// The record is keyed by prompt id and only gains an `outputs` section
    /// once execution has finished.
    async fn history(&self, prompt_id: &str) -> Result<serde_json::Value, ComfyUIApiError>;

    /// Query the engine's own status endpoint.
    async fn system_stats(&self) -> Result<serde_json::Value, ComfyUIApiError>;
}
