// src/handlers/admin.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::SqlitePool;

use crate::{
    core::authoring,
    error::AppError,
    models::{
        event::CreateEventRequest,
        quiz::{CreateAnswerRequest, CreateQuestionRequest, CreateQuizRequest},
    },
};

/// Creates a new quiz.
/// Admin only.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = authoring::create_quiz(&pool, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Quiz created successfully",
            "quiz": quiz
        })),
    ))
}

/// Creates a new question on an existing quiz.
/// Admin only.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = authoring::create_question(&pool, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Question created successfully",
            "question": question
        })),
    ))
}

/// Creates a new answer option on an existing question.
/// Admin only.
pub async fn create_answer(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let answer = authoring::create_answer(&pool, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Answer created successfully",
            "answer": answer
        })),
    ))
}

/// Creates a new event.
/// Admin only.
pub async fn create_event(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = authoring::create_event(&pool, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Event created successfully",
            "event": event
        })),
    ))
}
