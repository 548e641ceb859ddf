// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::core::authoring::{AuthoringError, FieldErrors};
use crate::core::submit::SubmitError;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 400 Bad Request with a field -> message map
    Fields(FieldErrors),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., duplicate submission, duplicate username)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal Server Error" }),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Fields(errors) => (StatusCode::BAD_REQUEST, json!({ "errors": errors })),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
        };

        (status, Json(body)).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Maps submission workflow failures onto the HTTP taxonomy: stale
/// references are 404, invariant conflicts 409, shape violations 400.
impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::QuizNotFound => AppError::NotFound(err.to_string()),
            SubmitError::DuplicateSubmission => AppError::Conflict(err.to_string()),
            SubmitError::EmptyQuiz => AppError::BadRequest(err.to_string()),
            SubmitError::Invalid(inner) => AppError::BadRequest(inner.to_string()),
            SubmitError::Db(inner) => AppError::from(inner),
        }
    }
}

impl From<AuthoringError> for AppError {
    fn from(err: AuthoringError) -> Self {
        match err {
            AuthoringError::Fields(fields) => AppError::Fields(fields),
            AuthoringError::QuizNotFound | AuthoringError::QuestionNotFound => {
                AppError::NotFound(err.to_string())
            }
            AuthoringError::DuplicateQuestion | AuthoringError::MultipleCorrectAnswers => {
                AppError::Conflict(err.to_string())
            }
            AuthoringError::Db(inner) => AppError::from(inner),
        }
    }
}
