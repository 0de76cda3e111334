use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::core::CalendarError;
use crate::input::InputError;

use super::error_response;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Debt(#[from] InputError),

    #[error("Invalid referenceMonth: {0}")]
    ReferenceMonth(#[from] CalendarError),

    #[error("Invalid request body: {0}")]
    Body(String),

    #[error("Not found")]
    NotFound,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation { .. }
            | ApiError::Debt(_)
            | ApiError::ReferenceMonth(_)
            | ApiError::Body(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status != StatusCode::NOT_FOUND {
            tracing::warn!(%status, error = %self, "rejected request");
        }
        error_response(status, &self.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
