//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use harmony_domain::error::{HarmonyError, NotFoundError};

/// JSON error body returned by the API.
#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
}

/// Maps [`HarmonyError`] to an HTTP response with appropriate status code.
pub struct ApiError(HarmonyError);

impl From<HarmonyError> for ApiError {
    fn from(err: HarmonyError) -> Self {
        Self(err)
    }
}

impl From<NotFoundError> for ApiError {
    fn from(err: NotFoundError) -> Self {
        Self(HarmonyError::NotFound(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            HarmonyError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            HarmonyError::Hub(err) | HarmonyError::Bus(err) => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}
