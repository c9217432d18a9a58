//! Liveness and readiness checks for the process supervisor.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::web::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: DatabaseHealth,
    pub bot_enabled: bool,
    pub admin_enabled: bool,
    pub active_events: i64,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: String,
    pub connection_pool_size: u32,
    pub response_time_ms: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route("/health/live", get(|| async { Json("alive") }))
}

/// Full report. Answers 503 with the same body shape when the database
/// round-trip fails.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let count = active_event_count(&state).await;
    let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let (status, database_status, active_events) = match count {
        Ok(count) => (StatusCode::OK, "healthy", count),
        Err(e) => {
            tracing::error!("Health check database query failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable", 0)
        }
    };

    let uptime_seconds = u64::try_from((Utc::now() - state.started_at).num_seconds()).unwrap_or(0);
    let body = HealthResponse {
        status: if status == StatusCode::OK { "healthy" } else { "degraded" }.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            status: database_status.to_string(),
            connection_pool_size: state.db.pool.size(),
            response_time_ms,
        },
        bot_enabled: state.bot_enabled,
        admin_enabled: state.admin_token.is_some(),
        active_events,
        uptime_seconds,
    };

    (status, Json(body))
}

async fn ready(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    active_event_count(&state)
        .await
        .map(|_| Json("ready"))
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)
}

async fn active_event_count(state: &AppState) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE is_active = 1")
        .fetch_one(&state.db.pool)
        .await
}
