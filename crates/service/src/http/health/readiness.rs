use std::time::Duration;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use tokio::time::timeout;

use crate::ServiceState;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Key probed against the backing store. It is never written; a clean
/// not-found answer proves the backend is reachable just as well as a hit.
const PROBE_KEY: &str = ".silo-readyz";

#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Response {
    match timeout(HEALTH_CHECK_TIMEOUT, state.storage().exists(PROBE_KEY)).await {
        Ok(result) => match result {
            Ok(_) => {
                let msg = serde_json::json!({"status": "ok"});
                (StatusCode::OK, Json(msg)).into_response()
            }
            Err(error) => {
                tracing::warn!(%error, "storage backend failed readiness probe");
                let msg = serde_json::json!({
                    "status": "failure",
                    "message": "storage backend isn't available"
                });
                (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
            }
        },
        Err(_) => {
            let msg = serde_json::json!({
                "status": "failure",
                "message": "health check timed out"
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
        }
    }
}
