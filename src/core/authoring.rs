// src/core/authoring.rs

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::models::event::{CreateEventRequest, Event};
use crate::models::quiz::{
    Answer, CreateAnswerRequest, CreateQuestionRequest, CreateQuizRequest, Question, QuestionKind,
    Quiz,
};
use crate::utils::html::clean_html;

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 255;
pub const DESCRIPTION_MAX: usize = 5000;
pub const QUESTION_TEXT_MIN: usize = 5;
pub const QUESTION_TEXT_MAX: usize = 2000;
pub const ANSWER_TEXT_MAX: usize = 255;
pub const LOCATION_MIN: usize = 3;
pub const LOCATION_MAX: usize = 255;

/// Field-level violations, keyed by field name. Keeps the first violation
/// per field; serialized as a plain JSON object for the API surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Promotes accumulated violations into an error, if any.
    fn into_result(self) -> Result<(), AuthoringError> {
        if self.is_empty() { Ok(()) } else { Err(AuthoringError::Fields(self)) }
    }
}

#[derive(Debug, Error)]
pub enum AuthoringError {
    #[error("Validation failed.")]
    Fields(FieldErrors),

    #[error("Quiz does not exist.")]
    QuizNotFound,

    #[error("Question does not exist.")]
    QuestionNotFound,

    #[error("This question already exists for this quiz.")]
    DuplicateQuestion,

    #[error("This question already has a correct answer. MCQ questions should have only one correct answer.")]
    MultipleCorrectAnswers,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Trims an optional description, drops it when blank, enforces the length
/// bound, and sanitizes it for storage.
fn prepare_description(
    raw: Option<String>,
    errors: &mut FieldErrors,
) -> Option<String> {
    let trimmed = raw.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())?;
    if trimmed.chars().count() > DESCRIPTION_MAX {
        errors.push(
            "description",
            format!("Description must be at most {DESCRIPTION_MAX} characters long."),
        );
        return None;
    }
    Some(clean_html(&trimmed))
}

/// Creates a quiz after field validation.
pub async fn create_quiz(
    pool: &SqlitePool,
    req: CreateQuizRequest,
) -> Result<Quiz, AuthoringError> {
    let title = req.title.trim().to_string();
    let mut errors = FieldErrors::new();

    let title_len = title.chars().count();
    if title_len < TITLE_MIN {
        errors.push("title", format!("Quiz title must be at least {TITLE_MIN} characters long."));
    } else if title_len > TITLE_MAX {
        errors.push("title", format!("Quiz title must be at most {TITLE_MAX} characters long."));
    }

    let description = prepare_description(req.description, &mut errors);
    errors.into_result()?;

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        INSERT INTO quizzes (title, description)
        VALUES (?, ?)
        RETURNING id, title, description, created_at, updated_at
        "#,
    )
    .bind(&title)
    .bind(&description)
    .fetch_one(pool)
    .await?;

    tracing::info!(quiz_id = quiz.id, "quiz created");
    Ok(quiz)
}

/// Creates a question after field validation and the per-quiz uniqueness
/// check. The case-insensitive duplicate check is backed by a UNIQUE index
/// on (quiz_id, lower(text)), so a concurrent duplicate still conflicts.
pub async fn create_question(
    pool: &SqlitePool,
    req: CreateQuestionRequest,
) -> Result<Question, AuthoringError> {
    let text = req.text.trim().to_string();
    let question_type = req.question_type.trim().to_string();
    let mut errors = FieldErrors::new();

    if req.quiz_id <= 0 {
        errors.push("quiz_id", "Quiz ID must be a positive integer.");
    }

    let text_len = text.chars().count();
    if text_len < QUESTION_TEXT_MIN {
        errors.push(
            "text",
            format!("Question text must be at least {QUESTION_TEXT_MIN} characters long."),
        );
    } else if text_len > QUESTION_TEXT_MAX {
        errors.push(
            "text",
            format!("Question text must be at most {QUESTION_TEXT_MAX} characters long."),
        );
    }

    if QuestionKind::parse(&question_type).is_none() {
        errors.push("question_type", "Question type must be one of: MCQ, TEXT.");
    }

    errors.into_result()?;

    let quiz = sqlx::query_scalar::<_, i64>("SELECT id FROM quizzes WHERE id = ?")
        .bind(req.quiz_id)
        .fetch_optional(pool)
        .await?;
    if quiz.is_none() {
        return Err(AuthoringError::QuizNotFound);
    }

    let duplicate = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM questions WHERE quiz_id = ? AND lower(text) = lower(?)",
    )
    .bind(req.quiz_id)
    .bind(&text)
    .fetch_optional(pool)
    .await?;
    if duplicate.is_some() {
        return Err(AuthoringError::DuplicateQuestion);
    }

    let question = sqlx::query_as::<_, Question>(
        r#"
        INSERT INTO questions (quiz_id, text, question_type)
        VALUES (?, ?, ?)
        RETURNING id, quiz_id, text, question_type, created_at
        "#,
    )
    .bind(req.quiz_id)
    .bind(&text)
    .bind(&question_type)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
            AuthoringError::DuplicateQuestion
        } else {
            AuthoringError::Db(e)
        }
    })?;

    tracing::info!(question_id = question.id, quiz_id = req.quiz_id, "question created");
    Ok(question)
}

/// Creates an answer option after field validation.
///
/// The single-correct-answer invariant for MCQ questions is a check-then-act
/// pair without a surrounding transaction: two concurrent creates can both
/// pass the check. Known race, kept advisory.
pub async fn create_answer(
    pool: &SqlitePool,
    req: CreateAnswerRequest,
) -> Result<Answer, AuthoringError> {
    let text = req.text.trim().to_string();
    let mut errors = FieldErrors::new();

    if req.question_id <= 0 {
        errors.push("question_id", "Question ID must be a positive integer.");
    }

    if text.is_empty() {
        errors.push("text", "Answer text cannot be empty.");
    } else if text.chars().count() > ANSWER_TEXT_MAX {
        errors.push(
            "text",
            format!("Answer text must be at most {ANSWER_TEXT_MAX} characters long."),
        );
    }

    let is_correct = req.is_correct.unwrap_or_else(|| {
        errors.push("is_correct", "is_correct field is required.");
        false
    });

    errors.into_result()?;

    let question = sqlx::query_as::<_, Question>(
        "SELECT id, quiz_id, text, question_type, created_at FROM questions WHERE id = ?",
    )
    .bind(req.question_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AuthoringError::QuestionNotFound)?;

    if is_correct && QuestionKind::parse(&question.question_type) == Some(QuestionKind::Mcq) {
        let existing_correct = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM answers WHERE question_id = ? AND is_correct = TRUE",
        )
        .bind(question.id)
        .fetch_optional(pool)
        .await?;
        if existing_correct.is_some() {
            return Err(AuthoringError::MultipleCorrectAnswers);
        }
    }

    let answer = sqlx::query_as::<_, Answer>(
        r#"
        INSERT INTO answers (question_id, text, is_correct)
        VALUES (?, ?, ?)
        RETURNING id, question_id, text, is_correct
        "#,
    )
    .bind(question.id)
    .bind(&text)
    .bind(is_correct)
    .fetch_one(pool)
    .await?;

    tracing::info!(answer_id = answer.id, question_id = question.id, "answer created");
    Ok(answer)
}

/// Creates an event after field validation.
pub async fn create_event(
    pool: &SqlitePool,
    req: CreateEventRequest,
) -> Result<Event, AuthoringError> {
    let title = req.title.trim().to_string();
    let location = req.location.trim().to_string();
    let mut errors = FieldErrors::new();

    let title_len = title.chars().count();
    if title_len < TITLE_MIN {
        errors.push("title", format!("Event title must be at least {TITLE_MIN} characters long."));
    } else if title_len > TITLE_MAX {
        errors.push("title", format!("Event title must be at most {TITLE_MAX} characters long."));
    }

    let location_len = location.chars().count();
    if location_len < LOCATION_MIN {
        errors.push(
            "location",
            format!("Event location must be at least {LOCATION_MIN} characters long."),
        );
    } else if location_len > LOCATION_MAX {
        errors.push(
            "location",
            format!("Event location must be at most {LOCATION_MAX} characters long."),
        );
    }

    if req.date.is_none() {
        errors.push("date", "Event date is required.");
    }

    let description = prepare_description(req.description, &mut errors);
    errors.into_result()?;

    let event = sqlx::query_as::<_, Event>(
        r#"
        INSERT INTO events (title, description, date, location)
        VALUES (?, ?, ?, ?)
        RETURNING id, title, description, date, location
        "#,
    )
    .bind(&title)
    .bind(&description)
    .bind(req.date)
    .bind(&location)
    .fetch_one(pool)
    .await?;

    tracing::info!(event_id = event.id, "event created");
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_keep_first_violation_per_field() {
        let mut errors = FieldErrors::new();
        errors.push("title", "first");
        errors.push("title", "second");
        assert_eq!(errors.get("title"), Some("first"));
    }

    #[test]
    fn blank_description_is_dropped() {
        let mut errors = FieldErrors::new();
        assert_eq!(prepare_description(Some("   ".to_string()), &mut errors), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn oversized_description_is_a_field_error() {
        let mut errors = FieldErrors::new();
        let long = "d".repeat(DESCRIPTION_MAX + 1);
        assert_eq!(prepare_description(Some(long), &mut errors), None);
        assert!(errors.get("description").is_some());
    }

    #[test]
    fn description_is_sanitized() {
        let mut errors = FieldErrors::new();
        let cleaned =
            prepare_description(Some("<script>alert(1)</script><b>ok</b>".to_string()), &mut errors)
                .unwrap();
        assert!(!cleaned.contains("script"));
        assert!(cleaned.contains("<b>ok</b>"));
    }
}
