use std::path::PathBuf;
use std::time::Duration;

use relay_comfyui::poller::PollConfig;

/// Default staging directory for downloaded inputs.
pub const DEFAULT_STAGING_DIR: &str = "/app/inputs";

/// Default directory the engine renders outputs into.
pub const DEFAULT_OUTPUT_DIR: &str = "/app/ComfyUI/output";

/// Default directory holding workflow templates.
pub const DEFAULT_WORKFLOWS_DIR: &str = "/app/ComfyUI/workflows";

/// Canonical template file name inside the workflows directory.
pub const DEFAULT_WORKFLOW: &str = "vibe_infinite.json";

/// Filesystem layout and timing for the job pipeline.
///
/// The directories are process-wide: concurrent jobs share them, so two
/// jobs with same-named inputs or outputs can overwrite each other's files.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub staging_dir: PathBuf,
    pub output_dir: PathBuf,
    pub workflows_dir: PathBuf,
    pub default_workflow: String,
    pub poll: PollConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            workflows_dir: PathBuf::from(DEFAULT_WORKFLOWS_DIR),
            default_workflow: DEFAULT_WORKFLOW.to_string(),
            poll: PollConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Replace the polling cadence and wait budget.
    pub fn with_poll(mut self, poll_interval: Duration, max_wait: Duration) -> Self {
        self.poll = PollConfig {
            poll_interval,
            max_wait,
        };
        self
    }
}
