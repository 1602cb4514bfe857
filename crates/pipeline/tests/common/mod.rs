//! In-process fakes for the engine and object store.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use relay_comfyui::api::ComfyUIApiError;
use relay_comfyui::engine::GenerationEngine;
use relay_pipeline::config::PipelineConfig;
use relay_pipeline::orchestrator::JobOrchestrator;
use relay_storage::error::StorageError;
use relay_storage::object_store::ObjectStore;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const PROMPT_ID: &str = "prompt-1";

/// Scripted generation engine.
///
/// History responses are served in order; once the script runs out the
/// prompt is reported as still pending.
#[derive(Default)]
pub struct FakeEngine {
    pub fail_submit: bool,
    pub history: Mutex<VecDeque<Result<Value, ComfyUIApiError>>>,
    pub submitted: Mutex<Vec<Value>>,
    pub history_calls: AtomicUsize,
}

impl FakeEngine {
    /// Engine that completes on the first query with the given outputs.
    pub fn completing_with(outputs: Value) -> Self {
        let engine = Self::default();
        engine
            .history
            .lock()
            .unwrap()
            .push_back(Ok(json!({ PROMPT_ID: { "outputs": outputs } })));
        engine
    }

    /// Engine that never completes.
    pub fn never_completing() -> Self {
        Self::default()
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn last_submitted(&self) -> Option<Value> {
        self.submitted.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationEngine for FakeEngine {
    async fn submit(&self, workflow: &Value) -> Result<String, ComfyUIApiError> {
        if self.fail_submit {
            return Err(ComfyUIApiError::ApiError {
                status: 500,
                body: "engine down".into(),
            });
        }
        self.submitted.lock().unwrap().push(workflow.clone());
        Ok(PROMPT_ID.to_string())
    }

    async fn history(&self, _prompt_id: &str) -> Result<Value, ComfyUIApiError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({})))
    }

    async fn system_stats(&self) -> Result<Value, ComfyUIApiError> {
        Ok(json!({ "system": {} }))
    }
}

/// Object store backed by nothing: downloads write a marker file,
/// uploads are recorded, presigned URLs are deterministic.
#[derive(Default)]
pub struct FakeStore {
    pub downloads: Mutex<Vec<(String, String)>>,
    pub uploads: Mutex<Vec<(String, String)>>,
}

impl FakeStore {
    pub fn call_count(&self) -> usize {
        self.downloads.lock().unwrap().len() + self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError> {
        tokio::fs::write(dest, format!("{bucket}/{key}")).await?;
        self.downloads
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn upload(&self, _src: &Path, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.uploads
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        Ok(format!(
            "https://{bucket}.s3.test/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }
}

/// Temporary filesystem layout for one test.
pub struct Workspace {
    pub root: TempDir,
}

impl Workspace {
    /// Creates the workflows and output directories with the canonical
    /// template in place.
    pub fn new() -> Self {
        let ws = Self {
            root: tempfile::tempdir().unwrap(),
        };
        std::fs::create_dir_all(ws.workflows_dir()).unwrap();
        std::fs::create_dir_all(ws.output_dir()).unwrap();
        ws.write_template("vibe_infinite.json", &sample_workflow());
        ws
    }

    /// Same as [`Workspace::new`] but without any template.
    pub fn without_templates() -> Self {
        let ws = Self::new();
        std::fs::remove_file(ws.workflows_dir().join("vibe_infinite.json")).unwrap();
        ws
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.path().join("inputs")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("output")
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.root.path().join("workflows")
    }

    pub fn write_template(&self, name: &str, body: &Value) {
        std::fs::write(self.workflows_dir().join(name), body.to_string()).unwrap();
    }

    pub fn write_output(&self, name: &str) {
        std::fs::write(self.output_dir().join(name), b"rendered").unwrap();
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            staging_dir: self.staging_dir(),
            output_dir: self.output_dir(),
            workflows_dir: self.workflows_dir(),
            ..PipelineConfig::default()
        }
        .with_poll(Duration::from_millis(10), Duration::from_millis(100))
    }

    pub fn orchestrator(&self, engine: Arc<FakeEngine>, store: Arc<FakeStore>) -> JobOrchestrator {
        JobOrchestrator::new(engine, store, self.config())
    }
}

pub fn sample_workflow() -> Value {
    json!({
        "1": { "class_type": "LoadAudio", "inputs": { "audio": "placeholder.wav" } },
        "2": { "class_type": "LoadTranscript", "inputs": { "text_file": "placeholder.txt" } },
        "3": { "class_type": "LoadImage", "inputs": { "image": "placeholder.png" } },
        "4": { "class_type": "KSampler", "inputs": { "seed": 7 } }
    })
}
