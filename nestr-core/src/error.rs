use crate::http::response::{IntoResponse, Response};
use crate::http::{Json, StatusCode};

/// Helper to create a JSON error response with a standard `{ "error": message }` body.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}

/// Transport-level error produced at the HTTP boundary.
///
/// Every lower-level error (data layer, view layer, query parsing) is
/// converted into one of these variants before it leaves a handler.
pub enum HttpError {
    NotFound(String),
    MethodNotAllowed(String),
    BadRequest(String),
    Internal(String),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            HttpError::NotFound(msg)
            | HttpError::MethodNotAllowed(msg)
            | HttpError::BadRequest(msg)
            | HttpError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            HttpError::NotFound(msg)
            | HttpError::MethodNotAllowed(msg)
            | HttpError::BadRequest(msg)
            | HttpError::Internal(msg) => error_response(status, msg),
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            HttpError::MethodNotAllowed(msg) => write!(f, "Method Not Allowed: {msg}"),
            HttpError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            HttpError::Internal(msg) => write!(f, "Internal Error: {msg}"),
        }
    }
}

impl std::fmt::Debug for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for HttpError {}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::BadRequest(err.to_string())
    }
}

impl From<crate::params::ParamError> for HttpError {
    fn from(err: crate::params::ParamError) -> Self {
        HttpError::BadRequest(err.message)
    }
}
