//! Generation engine liveness reporting.

use crate::engine::GenerationEngine;

/// Outcome of a single liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub healthy: bool,
    /// `"connected"` when healthy, otherwise the probe's error message.
    pub detail: String,
}

/// Probe the engine's `system_stats` endpoint. Has no side effects.
pub async fn check(engine: &dyn GenerationEngine) -> HealthReport {
    match engine.system_stats().await {
        Ok(_) => HealthReport {
            healthy: true,
            detail: "connected".to_string(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Generation engine health check failed");
            HealthReport {
                healthy: false,
                detail: e.to_string(),
            }
        }
    }
}
