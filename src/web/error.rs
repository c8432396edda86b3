use crate::{Error, ErrorType};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// An [`Error`] on its way to becoming an HTTP response.
#[derive(Debug)]
pub(super) struct ApiError(Error);

pub(super) type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub(super) fn bad_request(message: impl std::fmt::Display) -> Self {
        Self(Error::new(
            ErrorType::Request,
            anyhow::anyhow!("{message}"),
        ))
    }

    pub(super) fn not_found(message: impl std::fmt::Display) -> Self {
        Self(Error::not_found(message))
    }

    pub(super) fn internal(message: impl std::fmt::Display) -> Self {
        Self(Error::new(
            ErrorType::Internal,
            anyhow::anyhow!("{message}"),
        ))
    }

    pub(super) fn status(&self) -> StatusCode {
        match self.0.error_type() {
            ErrorType::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorType::Request => StatusCode::BAD_REQUEST,
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::Upstream => StatusCode::BAD_GATEWAY,
            ErrorType::Config
            | ErrorType::Database
            | ErrorType::Service
            | ErrorType::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[cfg(test)]
    pub(super) fn into_inner(self) -> Error {
        self.0
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();
        let body = match self.0.error_type() {
            ErrorType::Validation => json!({
                "message": message,
                "errors": self.0.validation_errors(),
            }),
            // The front end shows the provider's message as is.
            ErrorType::Upstream => json!({ "error": message }),
            _ => json!({ "message": message }),
        };
        if status.is_server_error() {
            error!("{status}: {:?}", self.0);
        }
        (status, Json(body)).into_response()
    }
}
