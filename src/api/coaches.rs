use axum::extract::State;
use axum::routing::get;
use axum::Router;
use dynasty_core::models::{Coach, CreateCoachInput, UpdateCoachInput};

use super::extract::{ApiJson, ApiPath};
use super::{ApiError, ApiResponse, ApiResult, AppState};

const COACH_NOT_FOUND: &str = "Coach playthrough not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_coaches).post(create_coach))
        .route("/most-recent", get(most_recent_coach))
        .route("/{playthrough_id}", get(get_coach).put(update_coach))
}

async fn list_coaches(State(state): State<AppState>) -> ApiResult<Vec<Coach>> {
    let coaches = state.db.list_coaches()?;
    Ok(ApiResponse::ok(coaches, "Coaches retrieved successfully"))
}

async fn create_coach(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateCoachInput>,
) -> ApiResult<Coach> {
    let coach = state.db.create_coach(input)?;
    Ok(ApiResponse::created(coach, "Coach playthrough created successfully"))
}

async fn most_recent_coach(State(state): State<AppState>) -> ApiResult<Coach> {
    let coach = state
        .db
        .most_recent_coach()?
        .ok_or_else(|| ApiError::not_found("No coaches found"))?;
    Ok(ApiResponse::ok(coach, "Most recent coach retrieved successfully"))
}

async fn get_coach(
    State(state): State<AppState>,
    ApiPath(playthrough_id): ApiPath<String>,
) -> ApiResult<Coach> {
    let coach = state
        .db
        .get_coach(&playthrough_id)?
        .ok_or_else(|| ApiError::not_found(COACH_NOT_FOUND))?;
    Ok(ApiResponse::ok(coach, "Coach playthrough retrieved successfully"))
}

async fn update_coach(
    State(state): State<AppState>,
    ApiPath(playthrough_id): ApiPath<String>,
    ApiJson(input): ApiJson<UpdateCoachInput>,
) -> ApiResult<Coach> {
    let coach = state
        .db
        .update_coach(&playthrough_id, input)?
        .ok_or_else(|| ApiError::not_found(COACH_NOT_FOUND))?;
    Ok(ApiResponse::ok(coach, "Coach playthrough updated successfully"))
}
