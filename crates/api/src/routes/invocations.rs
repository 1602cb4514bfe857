//! Route definitions for job invocation.

use axum::routing::post;
use axum::Router;

use crate::handlers::invocations;
use crate::state::AppState;

/// Routes mounted at the root.
///
/// ```text
/// POST   /invocations     -> invoke
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/invocations", post(invocations::invoke))
}
