//! Completion polling for submitted prompts.
//!
//! ComfyUI only exposes job completion through `GET /history/{prompt_id}`,
//! which returns an empty object until the prompt has finished. The poller
//! queries that endpoint on a fixed interval until the record gains an
//! `outputs` section or the wait budget runs out.
//!
//! Query failures do not end the wait: they are logged and treated as a
//! tick without a result.

use std::time::Duration;

use relay_core::error::CoreError;
use tokio::time::Instant;

use crate::engine::GenerationEngine;

/// Default delay between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default wait budget for a single prompt.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);

/// Timing parameters for [`await_completion`].
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The prompt did not reach a completed state within the wait budget.
    /// The prompt itself is left running on the engine.
    #[error("Workflow {prompt_id} did not complete within {} seconds", max_wait.as_secs())]
    TimedOut { prompt_id: String, max_wait: Duration },
}

impl From<PollError> for CoreError {
    fn from(err: PollError) -> Self {
        CoreError::Timeout(err.to_string())
    }
}

/// Extract the completed history entry for `prompt_id`, if present.
pub fn completed_entry(history: &serde_json::Value, prompt_id: &str) -> Option<serde_json::Value> {
    let entry = history.get(prompt_id)?;
    entry.get("outputs")?;
    Some(entry.clone())
}

/// Wait until `prompt_id` has outputs, returning its history entry.
///
/// The loop never gives up before `max_wait` has elapsed: the final sleep
/// is shortened so one last query lands on the deadline.
pub async fn await_completion(
    engine: &dyn GenerationEngine,
    prompt_id: &str,
    config: &PollConfig,
) -> Result<serde_json::Value, PollError> {
    let started = Instant::now();
    let mut ticks: u32 = 0;

    loop {
        ticks += 1;
        match engine.history(prompt_id).await {
            Ok(history) => {
                if let Some(entry) = completed_entry(&history, prompt_id) {
                    tracing::info!(
                        prompt_id,
                        ticks,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Workflow completed",
                    );
                    return Ok(entry);
                }
            }
            Err(e) => {
                tracing::warn!(prompt_id, ticks, error = %e, "Error checking workflow status");
            }
        }

        let elapsed = started.elapsed();
        if elapsed >= config.max_wait {
            tracing::warn!(
                prompt_id,
                ticks,
                max_wait_secs = config.max_wait.as_secs(),
                "Workflow wait budget exhausted",
            );
            return Err(PollError::TimedOut {
                prompt_id: prompt_id.to_string(),
                max_wait: config.max_wait,
            });
        }

        let remaining = config.max_wait - elapsed;
        tokio::time::sleep(config.poll_interval.min(remaining)).await;
    }
}
