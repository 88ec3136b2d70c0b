//! Typed HTTP client for the dynasty API.
//!
//! ```no_run
//! # async fn demo() -> Result<(), dynasty::client::ClientError> {
//! let client = dynasty::client::ApiClient::new("http://127.0.0.1:5000")?;
//! let schedule = client.get_schedule("P1", 2024).await?;
//! println!("{} games", schedule.games.len());
//! # Ok(())
//! # }
//! ```

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::health::{DatabaseStatus, HealthStatus};
use crate::api::Envelope;
use crate::models::{
    Coach, CreateCoachInput, CreateScheduleInput, CreateSchoolInput, Game, GameUpdate, Schedule,
    ScheduleStats, School, SchoolFilter, UpdateCoachInput, UpdateScheduleInput,
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("response had no data")]
    MissingData,
    #[error("invalid base url '{0}'")]
    InvalidBaseUrl(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_version: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_version(base_url, "v1")
    }

    pub fn with_version(base_url: &str, api_version: impl Into<String>) -> ClientResult<Self> {
        let invalid = || ClientError::InvalidBaseUrl(base_url.to_string());
        let base_url = Url::parse(base_url).map_err(|_| invalid())?;
        if base_url.cannot_be_a_base() {
            return Err(invalid());
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            api_version: api_version.into(),
        })
    }

    /// Builds `<base>/api/<version>/<segments...>`, encoding each segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").push(&self.api_version).extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http.request(method, self.url(segments))
    }

    /// Sends the request and unwraps the envelope's `data`.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        self.send_envelope(request).await?.data.ok_or(ClientError::MissingData)
    }

    async fn send_envelope<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<Envelope<T>> {
        let response = request.send().await?;
        let status = response.status();
        let envelope: Envelope<T> = response.json().await?;
        if !status.is_success() || !envelope.success {
            return Err(ClientError::Api {
                status,
                message: envelope.message,
            });
        }
        Ok(envelope)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        self.send(self.request(Method::GET, segments)).await
    }

    async fn with_body<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> ClientResult<T> {
        self.send(self.request(method, segments).json(body)).await
    }

    // Health

    pub async fn health(&self) -> ClientResult<HealthStatus> {
        let response = self.request(Method::GET, &["health"]).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status,
                message: "health check failed".to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// Database readiness; a 503 still decodes to a status with `success: false`.
    pub async fn database_health(&self) -> ClientResult<DatabaseStatus> {
        let response = self.request(Method::GET, &["health", "db"]).send().await?;
        Ok(response.json().await?)
    }

    // Schools

    pub async fn list_schools(&self, filter: &SchoolFilter) -> ClientResult<Vec<School>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(conference) = &filter.conference {
            query.push(("conference", conference.clone()));
        }
        if let Some(state) = &filter.state {
            query.push(("state", state.clone()));
        }
        if let Some(active) = filter.is_active {
            query.push(("isActive", active.to_string()));
        }
        self.send(self.request(Method::GET, &["schools"]).query(&query)).await
    }

    pub async fn create_school(&self, input: &CreateSchoolInput) -> ClientResult<School> {
        self.with_body(Method::POST, &["schools"], input).await
    }

    pub async fn get_school(&self, name: &str) -> ClientResult<School> {
        self.get(&["schools", name]).await
    }

    pub async fn conferences(&self) -> ClientResult<Vec<String>> {
        self.get(&["schools", "conferences"]).await
    }

    pub async fn schools_by_conference(&self, conference: &str) -> ClientResult<Vec<School>> {
        self.get(&["schools", "conference", conference]).await
    }

    pub async fn schools_by_state(&self, state: &str) -> ClientResult<Vec<School>> {
        self.get(&["schools", "state", state]).await
    }

    pub async fn school_rivals(&self, name: &str) -> ClientResult<Vec<School>> {
        self.get(&["schools", name, "rivals"]).await
    }

    // Coaches

    pub async fn list_coaches(&self) -> ClientResult<Vec<Coach>> {
        self.get(&["coaches"]).await
    }

    pub async fn create_coach(&self, input: &CreateCoachInput) -> ClientResult<Coach> {
        self.with_body(Method::POST, &["coaches"], input).await
    }

    pub async fn most_recent_coach(&self) -> ClientResult<Coach> {
        self.get(&["coaches", "most-recent"]).await
    }

    pub async fn get_coach(&self, playthrough_id: &str) -> ClientResult<Coach> {
        self.get(&["coaches", playthrough_id]).await
    }

    pub async fn update_coach(&self, playthrough_id: &str, input: &UpdateCoachInput) -> ClientResult<Coach> {
        self.with_body(Method::PUT, &["coaches", playthrough_id], input).await
    }

    // Schedules

    pub async fn list_schedules(&self) -> ClientResult<Vec<Schedule>> {
        self.get(&["schedules"]).await
    }

    pub async fn create_schedule(&self, input: &CreateScheduleInput) -> ClientResult<Schedule> {
        self.with_body(Method::POST, &["schedules"], input).await
    }

    pub async fn schedules_by_playthrough(&self, playthrough_id: &str) -> ClientResult<Vec<Schedule>> {
        self.get(&["schedules", "playthrough", playthrough_id]).await
    }

    pub async fn schedules_by_year(&self, year: i32) -> ClientResult<Vec<Schedule>> {
        self.get(&["schedules", "year", year.to_string().as_str()]).await
    }

    pub async fn schedules_by_team(&self, team_name: &str) -> ClientResult<Vec<Schedule>> {
        self.get(&["schedules", "team", team_name]).await
    }

    pub async fn get_schedule(&self, playthrough_id: &str, year: i32) -> ClientResult<Schedule> {
        self.get(&["schedules", playthrough_id, year.to_string().as_str()]).await
    }

    pub async fn update_schedule(
        &self,
        playthrough_id: &str,
        year: i32,
        input: &UpdateScheduleInput,
    ) -> ClientResult<Schedule> {
        let year = year.to_string();
        self.with_body(Method::PUT, &["schedules", playthrough_id, year.as_str()], input)
            .await
    }

    pub async fn delete_schedule(&self, playthrough_id: &str, year: i32) -> ClientResult<()> {
        let year = year.to_string();
        let request = self.request(Method::DELETE, &["schedules", playthrough_id, year.as_str()]);
        self.send_envelope::<serde_json::Value>(request).await?;
        Ok(())
    }

    pub async fn schedule_stats(&self, playthrough_id: &str, year: i32) -> ClientResult<ScheduleStats> {
        self.get(&["schedules", playthrough_id, year.to_string().as_str(), "stats"]).await
    }

    pub async fn add_game(&self, playthrough_id: &str, year: i32, game: &Game) -> ClientResult<Schedule> {
        let year = year.to_string();
        self.with_body(Method::POST, &["schedules", playthrough_id, year.as_str(), "games"], game)
            .await
    }

    pub async fn update_game(
        &self,
        playthrough_id: &str,
        year: i32,
        week: i32,
        update: &GameUpdate,
    ) -> ClientResult<Schedule> {
        let (year, week) = (year.to_string(), week.to_string());
        let segments = ["schedules", playthrough_id, year.as_str(), "games", week.as_str()];
        self.with_body(Method::PUT, &segments, update).await
    }

    pub async fn remove_game(&self, playthrough_id: &str, year: i32, week: i32) -> ClientResult<Schedule> {
        let (year, week) = (year.to_string(), week.to_string());
        let segments = ["schedules", playthrough_id, year.as_str(), "games", week.as_str()];
        self.send(self.request(Method::DELETE, &segments)).await
    }
}
