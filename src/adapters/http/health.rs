//! Liveness and readiness report.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::domain::foundation::Timestamp;
use crate::ports::SessionStore;

/// State for the health route.
#[derive(Clone)]
pub struct HealthState {
    started_at: Timestamp,
    store: Arc<dyn SessionStore>,
}

impl HealthState {
    /// Records the current instant as the start of uptime.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            started_at: Timestamp::now(),
            store,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when the store is unreachable
    pub status: &'static str,
    pub version: &'static str,
    /// Server start time, RFC 3339
    pub online_since: String,
    pub uptime_secs: i64,
    pub db_healthy: bool,
}

/// GET /health
async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "health check: session store unreachable");
            false
        }
    };

    let status = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let uptime_secs = Timestamp::now()
        .duration_since(&state.started_at)
        .num_seconds();

    (
        status,
        Json(HealthResponse {
            status: if db_healthy { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            online_since: state.started_at.as_datetime().to_rfc3339(),
            uptime_secs,
            db_healthy,
        }),
    )
}

/// Root-level health route.
pub fn health_routes(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}
