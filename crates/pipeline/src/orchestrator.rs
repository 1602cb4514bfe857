//! Top-level job handler.
//!
//! Drives one job through validate -> resolve -> template -> patch ->
//! submit -> poll -> publish. Each step returns `Result<_, CoreError>`;
//! [`JobOrchestrator::handle`] is the only place an error is turned into a
//! FAILED [`JobResult`], so callers always receive a result.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use relay_comfyui::engine::GenerationEngine;
use relay_comfyui::poller;
use relay_core::error::CoreError;
use relay_core::job::{Artifact, InvocationRequest, JobRequest, JobResult};
use relay_core::reference::OutputReference;
use relay_core::workflow::{self, ProducedFile};
use relay_storage::object_store::ObjectStore;
use relay_storage::publisher::ArtifactPublisher;
use relay_storage::resolver::ArtifactResolver;

use crate::config::PipelineConfig;
use crate::template::TemplateStore;

/// Runs jobs against one generation engine and one object store.
///
/// Holds no per-job state; a single instance is shared by all in-flight
/// jobs behind an `Arc`.
pub struct JobOrchestrator {
    engine: Arc<dyn GenerationEngine>,
    resolver: ArtifactResolver,
    publisher: ArtifactPublisher,
    templates: TemplateStore,
    config: PipelineConfig,
}

/// Facts gathered while a job runs that must survive a failure.
#[derive(Default)]
struct JobTrace {
    prompt_id: Option<String>,
    warnings: Vec<String>,
}

impl JobOrchestrator {
    pub fn new(
        engine: Arc<dyn GenerationEngine>,
        store: Arc<dyn ObjectStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            engine,
            resolver: ArtifactResolver::new(Arc::clone(&store), config.staging_dir.clone()),
            publisher: ArtifactPublisher::new(store),
            templates: TemplateStore::new(
                config.workflows_dir.clone(),
                config.default_workflow.clone(),
            ),
            config,
        }
    }

    pub fn engine(&self) -> &dyn GenerationEngine {
        self.engine.as_ref()
    }

    /// Run a job to a terminal state. Never fails.
    pub async fn handle(&self, request: InvocationRequest) -> JobResult {
        let job_id = request.assign_job_id();
        tracing::info!(job_id = %job_id, "Processing job");

        let job = match request.validate(job_id.clone()) {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Rejected job request");
                return JobResult::failed(Some(job_id), &e);
            }
        };

        let mut trace = JobTrace::default();
        match self.run(&job, &mut trace).await {
            Ok(outputs) => {
                let prompt_id = trace.prompt_id.unwrap_or_default();
                tracing::info!(
                    job_id = %job_id,
                    prompt_id = %prompt_id,
                    outputs = outputs.len(),
                    "Job completed",
                );
                JobResult::completed(job_id, prompt_id, outputs, trace.warnings)
            }
            Err(e) => {
                tracing::error!(
                    job_id = %job_id,
                    prompt_id = ?trace.prompt_id,
                    error = %e,
                    details = ?e,
                    "Error processing job",
                );
                JobResult::failed(Some(job_id), &e)
                    .with_prompt_id(trace.prompt_id)
                    .with_warnings(trace.warnings)
            }
        }
    }

    async fn run(&self, job: &JobRequest, trace: &mut JobTrace) -> Result<Vec<Artifact>, CoreError> {
        let mut bindings = Vec::with_capacity(job.inputs.len());
        for (slot, reference) in &job.inputs {
            let path = self.resolver.resolve(reference).await?;
            bindings.push((slot.workflow_param(), path.display().to_string()));
        }

        let template = self.templates.load().await?;
        if let Some(warning) = template.warning {
            trace.warnings.push(warning);
        }

        let mut document = template.document;
        let patched = document.patch_inputs(&bindings);
        if patched == 0 {
            tracing::warn!(
                job_id = %job.job_id,
                template = %template.path.display(),
                "Workflow has no bindable input parameters; submitting unchanged",
            );
        }

        let prompt_id = self.engine.submit(&document.into_value()).await?;
        tracing::info!(job_id = %job.job_id, prompt_id = %prompt_id, "Workflow submitted");
        trace.prompt_id = Some(prompt_id.clone());

        let entry = poller::await_completion(self.engine.as_ref(), &prompt_id, &self.config.poll)
            .await?;

        self.publish_outputs(&workflow::produced_files(&entry), &job.output)
            .await
    }

    /// Publish every reported file that exists in the output directory.
    /// Reported files that are absent on disk, or whose name is not a
    /// plain file name inside the output directory, are skipped.
    async fn publish_outputs(
        &self,
        files: &[ProducedFile],
        destination: &OutputReference,
    ) -> Result<Vec<Artifact>, CoreError> {
        let mut artifacts = Vec::new();
        for file in files {
            if !is_plain_file_name(&file.filename) {
                tracing::warn!(
                    filename = %file.filename,
                    "Reported output is not a plain file name, skipping",
                );
                continue;
            }

            let local_path: PathBuf = self.config.output_dir.join(&file.filename);
            if !tokio::fs::try_exists(&local_path).await? {
                tracing::debug!(filename = %file.filename, "Reported output not on disk, skipping");
                continue;
            }

            let url = self.publisher.publish(&local_path, destination).await?;
            artifacts.push(Artifact {
                kind: file.kind,
                filename: file.filename.clone(),
                url,
            });
        }
        Ok(artifacts)
    }
}

/// True when `name` is exactly one normal path component.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
