// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;

use crate::{
    core::submit,
    error::AppError,
    models::{
        quiz::{Answer, PublicAnswer, PublicQuestion, Question, Quiz, QuizDetail, QuizSummary},
        submission::{AnswerRecord, Submission, SubmissionDetail, SubmitQuizRequest},
    },
    utils::jwt::Claims,
};

/// Lists all quizzes with their question counts.
pub async fn list_quizzes(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let quizzes = sqlx::query_as::<_, QuizSummary>(
        r#"
        SELECT q.id, q.title, q.description, COUNT(n.id) AS num_questions
        FROM quizzes q
        LEFT JOIN questions n ON n.quiz_id = q.id
        GROUP BY q.id
        ORDER BY q.id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list quizzes: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(quizzes))
}

/// Retrieves a single quiz with its questions and answer options.
/// Correctness flags are hidden by the public DTOs.
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = sqlx::query_as::<_, Quiz>(
        "SELECT id, title, description, created_at, updated_at FROM quizzes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let questions = sqlx::query_as::<_, Question>(
        "SELECT id, quiz_id, text, question_type, created_at FROM questions WHERE quiz_id = ? ORDER BY id",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let options = sqlx::query_as::<_, Answer>(
        r#"
        SELECT a.id, a.question_id, a.text, a.is_correct
        FROM answers a
        JOIN questions q ON q.id = a.question_id
        WHERE q.quiz_id = ?
        ORDER BY a.id
        "#,
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    let mut by_question: HashMap<i64, Vec<PublicAnswer>> = HashMap::new();
    for option in options {
        by_question
            .entry(option.question_id)
            .or_default()
            .push(PublicAnswer { id: option.id, text: option.text });
    }

    let questions = questions
        .into_iter()
        .map(|q| PublicQuestion {
            answers: by_question.remove(&q.id).unwrap_or_default(),
            id: q.id,
            text: q.text,
            question_type: q.question_type,
        })
        .collect();

    Ok(Json(QuizDetail {
        id: quiz.id,
        title: quiz.title,
        description: quiz.description,
        questions,
    }))
}

/// Coerces the JSON answer values to the string mapping the core expects.
/// Scalars are stringified; null becomes empty (rejected downstream as an
/// empty answer); arrays and objects are refused outright.
fn coerce_answers(raw: HashMap<String, Value>) -> Result<HashMap<String, String>, AppError> {
    raw.into_iter()
        .map(|(question_id, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(AppError::BadRequest(format!(
                        "Answer for question {question_id} must be a string."
                    )));
                }
            };
            Ok((question_id, value))
        })
        .collect()
}

/// Submits a quiz attempt over the JSON API.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.answers.is_empty() {
        return Err(AppError::BadRequest("Answers are required.".to_string()));
    }

    let user_id = claims.user_id()?;
    let answers = coerce_answers(req.answers)?;

    let submission = submit::submit_quiz(&pool, req.quiz_id, user_id, &answers).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Quiz submitted successfully",
            "submission": submission
        })),
    ))
}

/// Lists the calling user's submissions, newest first.
pub async fn list_my_submissions(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let submissions = sqlx::query_as::<_, Submission>(
        r#"
        SELECT id, quiz_id, user_id, score, submitted_at
        FROM submissions
        WHERE user_id = ?
        ORDER BY submitted_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(submissions))
}

/// Retrieves a single submission with its answer records.
pub async fn get_submission(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let submission = sqlx::query_as::<_, Submission>(
        "SELECT id, quiz_id, user_id, score, submitted_at FROM submissions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Submission not found".to_string()))?;

    let answers = sqlx::query_as::<_, AnswerRecord>(
        r#"
        SELECT id, submission_id, question_id, answer_id, is_correct
        FROM submission_answers
        WHERE submission_id = ?
        ORDER BY question_id
        "#,
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(SubmissionDetail { submission, answers }))
}
