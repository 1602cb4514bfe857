//! Handler for the `/invocations` endpoint.
//!
//! Every response, success or failure, carries the same job result shape.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use relay_core::error::CoreError;
use relay_core::job::{InvocationRequest, JobResult, JobStatus};

use crate::state::AppState;

/// POST /invocations
///
/// Runs one job to completion on its own task and returns the result.
/// 200 on COMPLETED, 400 when the request is rejected, 500 otherwise.
pub async fn invoke(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<JobResult>) {
    let request = match decode_request(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected invocation body");
            let result = JobResult::failed(None, &e);
            return (status_for(&result), Json(result));
        }
    };

    // The job runs on its own task so a panic or a long wait stays
    // isolated from the connection and from other jobs.
    let orchestrator = Arc::clone(&state.orchestrator);
    let job_id = request.job_id.clone();
    let result = match tokio::spawn(async move { orchestrator.handle(request).await }).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(job_id = ?job_id, error = %e, "Job task aborted");
            JobResult::failed(job_id, &CoreError::Internal(format!("Job task aborted: {e}")))
        }
    };

    (status_for(&result), Json(result))
}

fn decode_request(body: &[u8]) -> Result<InvocationRequest, CoreError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|_| CoreError::Validation("No JSON data provided".into()))?;
    if !value.is_object() {
        return Err(CoreError::Validation("No JSON data provided".into()));
    }
    serde_json::from_value(value)
        .map_err(|e| CoreError::Validation(format!("Invalid request body: {e}")))
}

fn status_for(result: &JobResult) -> StatusCode {
    match result.status {
        JobStatus::Completed => StatusCode::OK,
        JobStatus::Failed if result.is_rejected() => StatusCode::BAD_REQUEST,
        JobStatus::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
