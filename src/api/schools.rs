use axum::extract::State;
use axum::routing::get;
use axum::Router;
use dynasty_core::models::{CreateSchoolInput, School, SchoolFilter};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{ApiError, ApiResponse, ApiResult, AppState};

const SCHOOLS_RETRIEVED: &str = "Schools retrieved successfully";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schools).post(create_school))
        .route("/conferences", get(list_conferences))
        .route("/conference/{conference}", get(schools_by_conference))
        .route("/state/{state}", get(schools_by_state))
        .route("/{name}", get(get_school))
        .route("/{name}/rivals", get(school_rivals))
}

async fn list_schools(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<SchoolFilter>,
) -> ApiResult<Vec<School>> {
    let schools = state.db.list_schools(&filter)?;
    Ok(ApiResponse::ok(schools, SCHOOLS_RETRIEVED))
}

async fn create_school(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateSchoolInput>,
) -> ApiResult<School> {
    let school = state.db.create_school(input)?;
    Ok(ApiResponse::created(school, "School created successfully"))
}

async fn list_conferences(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let conferences = state.db.conferences()?;
    Ok(ApiResponse::ok(conferences, "Conferences retrieved successfully"))
}

async fn schools_by_conference(
    State(state): State<AppState>,
    ApiPath(conference): ApiPath<String>,
) -> ApiResult<Vec<School>> {
    let schools = state.db.schools_by_conference(&conference)?;
    Ok(ApiResponse::ok(schools, SCHOOLS_RETRIEVED))
}

async fn schools_by_state(
    State(state): State<AppState>,
    ApiPath(us_state): ApiPath<String>,
) -> ApiResult<Vec<School>> {
    let schools = state.db.schools_by_state(&us_state)?;
    Ok(ApiResponse::ok(schools, SCHOOLS_RETRIEVED))
}

async fn get_school(State(state): State<AppState>, ApiPath(name): ApiPath<String>) -> ApiResult<School> {
    let school = state
        .db
        .get_school(&name)?
        .ok_or_else(|| ApiError::not_found("School not found"))?;
    Ok(ApiResponse::ok(school, "School retrieved successfully"))
}

async fn school_rivals(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Vec<School>> {
    let rivals = state
        .db
        .school_rivals(&name)?
        .ok_or_else(|| ApiError::not_found("School not found"))?;
    Ok(ApiResponse::ok(rivals, "Rivals retrieved successfully"))
}
