use std::sync::Arc;

use relay_pipeline::orchestrator::JobOrchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Job orchestrator shared by all in-flight invocations. Also owns the
    /// generation engine handle used by the health check.
    pub orchestrator: Arc<JobOrchestrator>,
}
