//! REST API client for the ComfyUI HTTP endpoints.
//!
//! Wraps the ComfyUI HTTP API (workflow submission, history retrieval,
//! system stats) using [`reqwest`]. Each call carries its own timeout.

use std::time::Duration;

use async_trait::async_trait;
use relay_core::error::CoreError;
use serde::Deserialize;

use crate::engine::GenerationEngine;

/// Timeout for `POST /prompt`.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for a single `GET /history/{prompt_id}` query.
pub const HISTORY_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for `GET /system_stats`.
pub const SYSTEM_STATS_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for a single ComfyUI instance.
pub struct ComfyUIApi {
    client: reqwest::Client,
    api_url: String,
    client_id: String,
}

/// Response returned by the ComfyUI `/prompt` endpoint.
///
/// `prompt_id` is optional here so that its absence surfaces as
/// [`ComfyUIApiError::MissingPromptId`] instead of a decode failure.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub prompt_id: Option<String>,
    /// Position in the execution queue.
    #[serde(default)]
    pub number: Option<i64>,
}

/// Errors from the ComfyUI REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ComfyUIApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// ComfyUI returned a non-2xx status code.
    #[error("ComfyUI API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// ComfyUI accepted the submission but returned no prompt id.
    #[error("No prompt_id in ComfyUI response")]
    MissingPromptId,
}

impl From<ComfyUIApiError> for CoreError {
    fn from(err: ComfyUIApiError) -> Self {
        let message = err.to_string();
        match err {
            ComfyUIApiError::MissingPromptId => CoreError::Protocol(message),
            ComfyUIApiError::Request(_) | ComfyUIApiError::ApiError { .. } => {
                CoreError::Transport(message)
            }
        }
    }
}

impl ComfyUIApi {
    /// Create a new API client for a ComfyUI instance.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://127.0.0.1:8188`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Submit a workflow for execution.
    ///
    /// Sends `POST /prompt` with the workflow and this client's id, and
    /// returns the server-assigned `prompt_id`.
    pub async fn submit_workflow(
        &self,
        workflow: &serde_json::Value,
    ) -> Result<String, ComfyUIApiError> {
        let body = serde_json::json!({
            "prompt": workflow,
            "client_id": self.client_id,
        });

        let response = self
            .client
            .post(format!("{}/prompt", self.api_url))
            .timeout(SUBMIT_TIMEOUT)
            .json(&body)
            .send()
            .await?;

        let submitted: SubmitResponse = Self::parse_response(response).await?;
        let prompt_id = submitted
            .prompt_id
            .filter(|id| !id.is_empty())
            .ok_or(ComfyUIApiError::MissingPromptId)?;

        tracing::info!(prompt_id = %prompt_id, queue_number = ?submitted.number, "Workflow submitted");
        Ok(prompt_id)
    }

    /// Retrieve execution history for a specific prompt.
    ///
    /// Sends a `GET /history/{prompt_id}` request. The returned JSON
    /// contains output file names, node results, and status data.
    pub async fn get_history(&self, prompt_id: &str) -> Result<serde_json::Value, ComfyUIApiError> {
        let response = self
            .client
            .get(format!("{}/history/{}", self.api_url, prompt_id))
            .timeout(HISTORY_TIMEOUT)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Sends `GET /system_stats`.
    pub async fn get_system_stats(&self) -> Result<serde_json::Value, ComfyUIApiError> {
        let response = self
            .client
            .get(format!("{}/system_stats", self.api_url))
            .timeout(SYSTEM_STATS_TIMEOUT)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ComfyUIApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ComfyUIApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ComfyUIApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ComfyUIApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GenerationEngine for ComfyUIApi {
    async fn submit(&self, workflow: &serde_json::Value) -> Result<String, ComfyUIApiError> {
        self.submit_workflow(workflow).await
    }

    async fn history(&self, prompt_id: &str) -> Result<serde_json::Value, ComfyUIApiError> {
        self.get_history(prompt_id).await
    }

    async fn system_stats(&self) -> Result<serde_json::Value, ComfyUIApiError> {
        self.get_system_stats().await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn submit_returns_prompt_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/prompt"))
            .and(body_partial_json(json!({ "prompt": { "1": { "inputs": {} } } })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "prompt_id": "abc", "number": 3 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = ComfyUIApi::new(server.uri());
        let prompt_id = api
            .submit_workflow(&json!({ "1": { "inputs": {} } }))
            .await
            .unwrap();

        assert_eq!(prompt_id, "abc");
    }

    #[tokio::test]
    async fn submit_without_prompt_id_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/prompt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "number": 1 })))
            .mount(&server)
            .await;

        let api = ComfyUIApi::new(server.uri());
        let err = api.submit_workflow(&json!({})).await.unwrap_err();

        assert_matches!(err, ComfyUIApiError::MissingPromptId);
        assert_matches!(CoreError::from(err), CoreError::Protocol(_));
    }

    #[tokio::test]
    async fn submit_non_success_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/prompt"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid prompt"))
            .mount(&server)
            .await;

        let api = ComfyUIApi::new(server.uri());
        let err = api.submit_workflow(&json!({})).await.unwrap_err();

        assert_matches!(
            &err,
            ComfyUIApiError::ApiError { status: 400, body } if body == "invalid prompt"
        );
        assert_matches!(CoreError::from(err), CoreError::Transport(_));
    }

    #[tokio::test]
    async fn history_returns_raw_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history/abc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "abc": { "outputs": {} } })),
            )
            .mount(&server)
            .await;

        let api = ComfyUIApi::new(format!("{}/", server.uri()));
        let history = api.get_history("abc").await.unwrap();

        assert_eq!(history, json!({ "abc": { "outputs": {} } }));
    }

    #[tokio::test]
    async fn system_stats_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/system_stats"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let api = ComfyUIApi::new(server.uri());
        assert_matches!(
            api.get_system_stats().await,
            Err(ComfyUIApiError::ApiError { status: 503, .. })
        );
    }

    #[tokio::test]
    async fn unreachable_engine_is_request_error() {
        // Port 9 (discard) is not expected to run an HTTP server.
        let api = ComfyUIApi::new("http://127.0.0.1:9");
        assert_matches!(
            api.get_system_stats().await,
            Err(ComfyUIApiError::Request(_))
        );
    }
}
