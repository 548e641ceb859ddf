// src/models/submission.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'submissions' table in the database.
/// One completed attempt at one quiz by one user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,

    /// Number of correctly answered multiple-choice questions.
    pub score: i64,

    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// Represents the 'submission_answers' table in the database.
/// The stored outcome for one question within one submission; written once
/// inside the submission transaction and never mutated afterwards.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub id: i64,
    pub submission_id: i64,
    pub question_id: i64,

    /// The selected option for MCQ questions; NULL for free-text questions.
    pub answer_id: Option<i64>,

    /// Always false for free-text questions.
    pub is_correct: bool,
}

/// A submission together with its per-question answer records.
#[derive(Debug, Serialize)]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub submission: Submission,
    pub answers: Vec<AnswerRecord>,
}

/// DTO for submitting a quiz attempt over the JSON API.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub quiz_id: i64,

    /// User's answers map.
    /// Key: question id (as string).
    /// Value: answer id for MCQ questions, raw text for TEXT questions.
    /// Values arrive as arbitrary JSON and are coerced to strings at the
    /// adapter boundary; nulls and non-scalar values are rejected.
    pub answers: HashMap<String, serde_json::Value>,
}
