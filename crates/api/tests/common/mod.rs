#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use relay_api::config::ServerConfig;
use relay_api::router::build_app_router;
use relay_api::state::AppState;
use relay_comfyui::api::ComfyUIApiError;
use relay_comfyui::engine::GenerationEngine;
use relay_pipeline::orchestrator::JobOrchestrator;
use relay_storage::error::StorageError;
use relay_storage::object_store::ObjectStore;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PROMPT_ID: &str = "prompt-1";

/// Generation engine fake with scripted history responses.
#[derive(Default)]
pub struct FakeEngine {
    pub offline: bool,
    pub history: Mutex<VecDeque<Value>>,
    pub calls: AtomicUsize,
}

impl FakeEngine {
    pub fn completing_with(outputs: Value) -> Self {
        let engine = Self::default();
        engine
            .history
            .lock()
            .unwrap()
            .push_back(json!({ PROMPT_ID: { "outputs": outputs } }));
        engine
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn unreachable() -> ComfyUIApiError {
        ComfyUIApiError::ApiError {
            status: 502,
            body: "connection refused".into(),
        }
    }
}

#[async_trait]
impl GenerationEngine for FakeEngine {
    async fn submit(&self, _workflow: &Value) -> Result<String, ComfyUIApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(Self::unreachable());
        }
        Ok(PROMPT_ID.to_string())
    }

    async fn history(&self, _prompt_id: &str) -> Result<Value, ComfyUIApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.history.lock().unwrap().pop_front().unwrap_or_else(|| json!({})))
    }

    async fn system_stats(&self) -> Result<Value, ComfyUIApiError> {
        if self.offline {
            return Err(Self::unreachable());
        }
        Ok(json!({ "system": { "os": "posix" } }))
    }
}

/// Object store fake: downloads write a marker file, uploads are counted.
#[derive(Default)]
pub struct FakeStore {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::write(dest, format!("{bucket}/{key}")).await?;
        Ok(())
    }

    async fn upload(&self, _src: &Path, _bucket: &str, _key: &str) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        _expires_in: Duration,
    ) -> Result<String, StorageError> {
        Ok(format!("https://{bucket}.s3.test/{key}"))
    }
}

/// A test application plus the fakes and directories behind it.
pub struct TestApp {
    pub router: Router,
    pub engine: Arc<FakeEngine>,
    pub store: Arc<FakeStore>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.dir.path().join("workflows")
    }
}

/// Build a test `ServerConfig` pointing every directory into `root` with
/// a short poll budget.
pub fn test_config(root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        comfy_url: "http://127.0.0.1:8188".to_string(),
        aws_region: "us-east-1".to_string(),
        staging_dir: root.join("inputs"),
        output_dir: root.join("output"),
        workflows_dir: root.join("workflows"),
        default_workflow: "vibe_infinite.json".to_string(),
        poll_interval_ms: 10,
        max_wait_secs: 1,
        request_timeout_secs: 30,
    }
}

/// Build the full application router around the given engine, with the
/// canonical workflow template in place.
pub fn build_test_app(engine: FakeEngine) -> TestApp {
    build_test_app_with(engine, |_| {})
}

/// Same as [`build_test_app`] but lets the caller adjust the config first.
pub fn build_test_app_with(engine: FakeEngine, adjust: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    adjust(&mut config);
    std::fs::create_dir_all(&config.workflows_dir).unwrap();
    std::fs::create_dir_all(&config.output_dir).unwrap();
    std::fs::write(
        config.workflows_dir.join("vibe_infinite.json"),
        json!({
            "1": { "inputs": { "audio": "a" } },
            "2": { "inputs": { "text_file": "t" } },
            "3": { "inputs": { "image": "i" } }
        })
        .to_string(),
    )
    .unwrap();

    let engine = Arc::new(engine);
    let store = Arc::new(FakeStore::default());
    let orchestrator = Arc::new(JobOrchestrator::new(
        engine.clone(),
        store.clone(),
        config.pipeline_config(),
    ));
    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator,
    };

    TestApp {
        router: build_app_router(state, &config),
        engine,
        store,
        dir,
    }
}

/// Issue a GET request against the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a POST request with a raw body against the router.
pub async fn post_raw(app: Router, uri: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a POST request with a JSON body against the router.
pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    post_raw(app, uri, body.to_string()).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
