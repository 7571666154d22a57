use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LivenessResponse {
    status: &'static str,
    uptime: u64,
    started_at: String,
    version: &'static str,
}

async fn root(State(state): State<AppState>) -> Response {
    let snapshot = state.db_proxy().health_check().await;
    if let Some(error) = snapshot.error.as_deref() {
        tracing::warn!(error, "database health check failed");
    }

    let response = HealthResponse {
        status: if snapshot.healthy { "ok" } else { "degraded" },
        database: if snapshot.healthy { "connected" } else { "disconnected" },
        latency_ms: snapshot.latency_ms,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    let status_code = if snapshot.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    let started_at: DateTime<Utc> = state.started_at_system().into();
    Json(LivenessResponse {
        status: "healthy",
        uptime: state.uptime_seconds(),
        started_at: started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION"),
    })
    .into_response()
}
