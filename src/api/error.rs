use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dynasty_core::{StoreError, ValidationErrors};
use serde_json::Value;

use super::response::Envelope;
use super::AppState;

pub type ApiResult<T> = Result<super::ApiResponse<T>, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(err) => match err {
                StoreError::Validation(_) | StoreError::Invariant(_) => StatusCode::BAD_REQUEST,
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) | Self::Store(StoreError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    /// Display text of this error and each of its sources.
    fn chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            chain.push(err.to_string());
            source = err.source();
        }
        chain
    }
}

/// Error details kept on 5xx responses so the dev-mode layer can expose them.
#[derive(Debug, Clone)]
pub struct ServerFault {
    stack: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut envelope = Envelope::<()>::failure(match self.validation_errors() {
            Some(_) => "Validation failed".to_string(),
            None if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE => {
                "Internal server error".to_string()
            }
            None => self.to_string(),
        });
        if let Some(errors) = self.validation_errors() {
            envelope.errors = Some(errors.0.clone());
        }

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let mut response = (status, Json(envelope)).into_response();
        if status.is_server_error() {
            response.extensions_mut().insert(ServerFault { stack: self.chain() });
        }
        response
    }
}

/// Re-renders 5xx bodies with the error chain when running in development.
pub async fn expose_server_faults(State(state): State<AppState>, mut response: Response) -> Response {
    if !state.config.run_mode.is_development() {
        return response;
    }
    let Some(fault) = response.extensions_mut().remove::<ServerFault>() else {
        return response;
    };

    let status = response.status();
    let mut envelope = Envelope::<()>::failure(fault.stack.first().cloned().unwrap_or_default());
    envelope.stack = Some(fault.stack);
    (status, Json(envelope)).into_response()
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationErrors::single("body", rejection.body_text(), Value::Null))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(ValidationErrors::single("query", rejection.body_text(), Value::Null))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(ValidationErrors::single("path", rejection.body_text(), Value::Null))
    }
}

/// Parses a numeric path segment, reporting the raw text on failure.
pub fn parse_segment(field: &str, label: &str, raw: &str) -> Result<i32, ApiError> {
    raw.trim().parse().map_err(|_| {
        ApiError::Validation(ValidationErrors::single(
            field,
            format!("{label} must be an integer"),
            raw,
        ))
    })
}
