use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use prism_sources::CompositeError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Invalid path parameters.
    #[error("{0}")]
    BadRequest(String),

    /// A backend failed while resolving.
    #[error(transparent)]
    Resolution(#[from] CompositeError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    backend: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, backend) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad Request", None),
            AppError::Resolution(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                Some(e.backend()),
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
            backend,
        });

        (status, body).into_response()
    }
}
