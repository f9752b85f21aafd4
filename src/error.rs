use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures at the statistics boundary. None of these abort aggregation;
/// handlers turn them into zero-valued results plus a message.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Failed to load statistics: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to load statistics: upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Authentication required")]
    MissingUserContext,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::MissingUserContext => AppError::Unauthorized,
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errs: validator::ValidationErrors) -> Self {
        AppError::Validation(errs.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        let body = json!({
            "error": {
                "message": message,
                "code": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
