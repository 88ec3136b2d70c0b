use axum::extract::State;
use axum::routing::{get, post, put};
use axum::Router;
use dynasty_core::models::{
    CreateScheduleInput, Game, GameUpdate, Schedule, ScheduleStats, UpdateScheduleInput,
};

use super::error::parse_segment;
use super::extract::{ApiJson, ApiPath};
use super::{ApiError, ApiResponse, ApiResult, AppState};

const SCHEDULES_RETRIEVED: &str = "Schedules retrieved successfully";
const SCHEDULE_NOT_FOUND: &str = "Schedule not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route("/playthrough/{playthrough_id}", get(schedules_by_playthrough))
        .route("/year/{year}", get(schedules_by_year))
        .route("/team/{team_name}", get(schedules_by_team))
        .route(
            "/{playthrough_id}/{year}",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
        .route("/{playthrough_id}/{year}/stats", get(schedule_stats))
        .route("/{playthrough_id}/{year}/games", post(add_game))
        .route(
            "/{playthrough_id}/{year}/games/{week}",
            put(update_game).delete(remove_game),
        )
}

fn year(raw: &str) -> Result<i32, ApiError> {
    parse_segment("year", "Year", raw)
}

fn week(raw: &str) -> Result<i32, ApiError> {
    parse_segment("week", "Week", raw)
}

async fn list_schedules(State(state): State<AppState>) -> ApiResult<Vec<Schedule>> {
    let schedules = state.db.list_schedules()?;
    Ok(ApiResponse::ok(schedules, SCHEDULES_RETRIEVED))
}

async fn create_schedule(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateScheduleInput>,
) -> ApiResult<Schedule> {
    let schedule = state.db.create_schedule(input)?;
    Ok(ApiResponse::created(schedule, "Schedule created successfully"))
}

async fn schedules_by_playthrough(
    State(state): State<AppState>,
    ApiPath(playthrough_id): ApiPath<String>,
) -> ApiResult<Vec<Schedule>> {
    let schedules = state.db.schedules_by_playthrough(&playthrough_id)?;
    Ok(ApiResponse::ok(schedules, SCHEDULES_RETRIEVED))
}

async fn schedules_by_year(
    State(state): State<AppState>,
    ApiPath(raw_year): ApiPath<String>,
) -> ApiResult<Vec<Schedule>> {
    let schedules = state.db.schedules_by_year(year(&raw_year)?)?;
    Ok(ApiResponse::ok(schedules, SCHEDULES_RETRIEVED))
}

async fn schedules_by_team(
    State(state): State<AppState>,
    ApiPath(team_name): ApiPath<String>,
) -> ApiResult<Vec<Schedule>> {
    let schedules = state.db.schedules_by_team(&team_name)?;
    Ok(ApiResponse::ok(schedules, SCHEDULES_RETRIEVED))
}

async fn get_schedule(
    State(state): State<AppState>,
    ApiPath((playthrough_id, raw_year)): ApiPath<(String, String)>,
) -> ApiResult<Schedule> {
    let schedule = state
        .db
        .get_schedule(&playthrough_id, year(&raw_year)?)?
        .ok_or_else(|| ApiError::not_found(SCHEDULE_NOT_FOUND))?;
    Ok(ApiResponse::ok(schedule, "Schedule retrieved successfully"))
}

async fn update_schedule(
    State(state): State<AppState>,
    ApiPath((playthrough_id, raw_year)): ApiPath<(String, String)>,
    ApiJson(input): ApiJson<UpdateScheduleInput>,
) -> ApiResult<Schedule> {
    let schedule = state.db.update_schedule(&playthrough_id, year(&raw_year)?, input)?;
    Ok(ApiResponse::ok(schedule, "Schedule updated successfully"))
}

async fn delete_schedule(
    State(state): State<AppState>,
    ApiPath((playthrough_id, raw_year)): ApiPath<(String, String)>,
) -> ApiResult<()> {
    if !state.db.delete_schedule(&playthrough_id, year(&raw_year)?)? {
        return Err(ApiError::not_found(SCHEDULE_NOT_FOUND));
    }
    Ok(ApiResponse::message("Schedule deleted successfully"))
}

async fn schedule_stats(
    State(state): State<AppState>,
    ApiPath((playthrough_id, raw_year)): ApiPath<(String, String)>,
) -> ApiResult<ScheduleStats> {
    let stats = state
        .db
        .schedule_stats(&playthrough_id, year(&raw_year)?)?
        .ok_or_else(|| ApiError::not_found(SCHEDULE_NOT_FOUND))?;
    Ok(ApiResponse::ok(stats, "Schedule statistics retrieved successfully"))
}

async fn add_game(
    State(state): State<AppState>,
    ApiPath((playthrough_id, raw_year)): ApiPath<(String, String)>,
    ApiJson(game): ApiJson<Game>,
) -> ApiResult<Schedule> {
    let schedule = state.db.add_game(&playthrough_id, year(&raw_year)?, game)?;
    Ok(ApiResponse::ok(schedule, "Game added to schedule successfully"))
}

async fn update_game(
    State(state): State<AppState>,
    ApiPath((playthrough_id, raw_year, raw_week)): ApiPath<(String, String, String)>,
    ApiJson(update): ApiJson<GameUpdate>,
) -> ApiResult<Schedule> {
    let schedule = state
        .db
        .update_game(&playthrough_id, year(&raw_year)?, week(&raw_week)?, update)?;
    Ok(ApiResponse::ok(schedule, "Game updated successfully"))
}

async fn remove_game(
    State(state): State<AppState>,
    ApiPath((playthrough_id, raw_year, raw_week)): ApiPath<(String, String, String)>,
) -> ApiResult<Schedule> {
    let schedule = state
        .db
        .remove_game(&playthrough_id, year(&raw_year)?, week(&raw_week)?)?;
    Ok(ApiResponse::ok(schedule, "Game removed from schedule successfully"))
}
