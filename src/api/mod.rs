//! HTTP API: routing, shared state and the response envelope.

mod coaches;
pub mod error;
pub mod extract;
pub mod health;
pub mod response;
mod schedules;
mod schools;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{OriginalUri, State};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;

pub use error::{ApiError, ApiResult};
pub use response::{ApiResponse, Envelope};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub started_at: Instant,
}

pub fn create_router(db: Database, config: Config) -> Router {
    let prefix = config.api_prefix();
    let state = AppState {
        db,
        config: Arc::new(config),
        started_at: Instant::now(),
    };

    let api = Router::new()
        .nest("/health", health::routes())
        .nest("/schools", schools::routes())
        .nest("/coaches", coaches::routes())
        .nest("/schedules", schedules::routes());

    Router::new()
        .route("/", get(root))
        .nest(&prefix, api)
        .fallback(not_found)
        .layer(middleware::map_response_with_state(
            state.clone(),
            error::expose_server_faults,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Dynasty Service API",
        "version": state.config.api_version,
        "status": "running",
    }))
}

async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::not_found(format!("Not Found - {}", uri.path()))
}
