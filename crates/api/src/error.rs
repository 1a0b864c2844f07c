use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use infra::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Required field missing or malformed; the step is never advanced.
    #[error("{0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("no registration found")]
    NotFound,

    /// The bounded tracking-id allocation gave up without finding a free
    /// identifier.
    #[error("could not allocate a tracking id")]
    IdSpaceExhausted,

    #[error("database error")]
    Store(#[from] StoreError),

    #[error("database error")]
    Db(#[from] sqlx::Error),

    /// Only the email relay endpoint fails on this; the lifecycle treats
    /// dispatch failures as warnings instead.
    #[error("failed to send email")]
    Notification(String),

    #[error("internal error")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::IdSpaceExhausted => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Store(_)
            | AppError::Db(_)
            | AppError::Notification(_)
            | AppError::Internal(_)
            | AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            match &self {
                AppError::Notification(detail) => tracing::error!(%detail, "email relay failed"),
                other => tracing::error!(error = ?other, "request failed"),
            }
        }

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
