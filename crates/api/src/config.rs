use std::path::PathBuf;
use std::time::Duration;

use relay_pipeline::config::{
    PipelineConfig, DEFAULT_OUTPUT_DIR, DEFAULT_STAGING_DIR, DEFAULT_WORKFLOW,
    DEFAULT_WORKFLOWS_DIR,
};

/// Headroom added to the poll budget when deriving the request timeout, so
/// the HTTP layer never cuts off a job that is still inside its wait budget.
const REQUEST_TIMEOUT_HEADROOM_SECS: u64 = 60;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults matching the container layout; override via
/// environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Base URL of the ComfyUI HTTP API.
    pub comfy_url: String,
    /// AWS region for the S3 client.
    pub aws_region: String,
    pub staging_dir: PathBuf,
    pub output_dir: PathBuf,
    pub workflows_dir: PathBuf,
    pub default_workflow: String,
    pub poll_interval_ms: u64,
    pub max_wait_secs: u64,
    /// HTTP request timeout in seconds (default: `MAX_WAIT_SECS + 60`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8080`                     |
    /// | `COMFY_URL`            | `http://127.0.0.1:8188`    |
    /// | `AWS_REGION`           | `us-east-1`                |
    /// | `INPUT_STAGING_DIR`    | `/app/inputs`              |
    /// | `COMFY_OUTPUT_DIR`     | `/app/ComfyUI/output`      |
    /// | `WORKFLOWS_DIR`        | `/app/ComfyUI/workflows`   |
    /// | `DEFAULT_WORKFLOW`     | `vibe_infinite.json`       |
    /// | `POLL_INTERVAL_MS`     | `2000`                     |
    /// | `MAX_WAIT_SECS`        | `300`                      |
    /// | `REQUEST_TIMEOUT_SECS` | `MAX_WAIT_SECS + 60`       |
    ///
    /// Panics on unparseable numeric values; misconfiguration should fail
    /// at startup.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port: u16 = var("PORT", "8080")
            .parse()
            .expect("PORT must be a valid u16");

        let poll_interval_ms: u64 = var("POLL_INTERVAL_MS", "2000")
            .parse()
            .expect("POLL_INTERVAL_MS must be a valid u64");

        let max_wait_secs: u64 = var("MAX_WAIT_SECS", "300")
            .parse()
            .expect("MAX_WAIT_SECS must be a valid u64");

        let request_timeout_secs: u64 = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .expect("REQUEST_TIMEOUT_SECS must be a valid u64"),
            None => max_wait_secs + REQUEST_TIMEOUT_HEADROOM_SECS,
        };

        Self {
            host: var("HOST", "0.0.0.0"),
            port,
            comfy_url: var("COMFY_URL", "http://127.0.0.1:8188"),
            aws_region: var("AWS_REGION", "us-east-1"),
            staging_dir: PathBuf::from(var("INPUT_STAGING_DIR", DEFAULT_STAGING_DIR)),
            output_dir: PathBuf::from(var("COMFY_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
            workflows_dir: PathBuf::from(var("WORKFLOWS_DIR", DEFAULT_WORKFLOWS_DIR)),
            default_workflow: var("DEFAULT_WORKFLOW", DEFAULT_WORKFLOW),
            poll_interval_ms,
            max_wait_secs,
            request_timeout_secs,
        }
    }

    /// Pipeline settings derived from this configuration.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            staging_dir: self.staging_dir.clone(),
            output_dir: self.output_dir.clone(),
            workflows_dir: self.workflows_dir.clone(),
            default_workflow: self.default_workflow.clone(),
            ..PipelineConfig::default()
        }
        .with_poll(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_secs(self.max_wait_secs),
        )
    }
}
