use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started.
    pub uptime: f64,
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseState {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStatus {
    pub success: bool,
    pub database: DatabaseState,
    pub timestamp: DateTime<Utc>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/db", get(database_health))
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        success: true,
        message: "Dynasty service is running".to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.config.run_mode.as_str().to_string(),
    })
}

async fn database_health(State(state): State<AppState>) -> impl IntoResponse {
    let (status, connected) = match state.db.ping() {
        Ok(()) => (StatusCode::OK, true),
        Err(err) => {
            tracing::warn!(error = %err, "database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, false)
        }
    };

    let body = DatabaseStatus {
        success: connected,
        database: DatabaseState {
            status: if connected { "connected" } else { "disconnected" }.to_string(),
        },
        timestamp: Utc::now(),
    };
    (status, Json(body))
}
