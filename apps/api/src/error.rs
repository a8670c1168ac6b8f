use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lumina_core::AppError;
use serde::Serialize;
use tracing::error;
use ts_rs::TS;

/// Body returned when a request fails outside the form submission flow.
///
/// Field-level problems never end up here; they travel in the submission
/// response with a 422.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "form_locked"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "not_signed_in"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }

    fn payload(&self) -> ErrorResponse {
        let (_, code) = self.status_and_code();
        let message = match &self.0 {
            AppError::Internal(_) => "Something went wrong. Please try again.".to_owned(),
            other => other.to_string(),
        };

        ErrorResponse { code, message }
    }
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self.0 {
            error!(%detail, "request failed");
        }

        let (status, _) = self.status_and_code();
        (status, Json(self.payload())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
