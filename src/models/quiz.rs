// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,

    /// The text content of the question. Unique per quiz, case-insensitively.
    pub text: String,

    /// Question type: 'MCQ' or 'TEXT'. Interpreted through [`QuestionKind`];
    /// kept as raw text here so an unrecognized stored value surfaces as a
    /// validation error instead of a decode failure.
    pub question_type: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Question kind. All type branching goes through this variant so a new kind
/// extends the enum rather than every caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionKind {
    /// Multiple choice: the answer is the id of one predefined option.
    Mcq,
    /// Free text: the answer is a raw string, never scored.
    Text,
}

impl QuestionKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "MCQ" => Some(QuestionKind::Mcq),
            "TEXT" => Some(QuestionKind::Text),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Mcq => "MCQ",
            QuestionKind::Text => "TEXT",
        }
    }
}

/// Represents the 'answers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub is_correct: bool,
}

/// Quiz list item with its question count.
#[derive(Debug, Serialize, FromRow)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub num_questions: i64,
}

/// DTO for sending an answer option to clients (excludes the correctness flag).
#[derive(Debug, Serialize)]
pub struct PublicAnswer {
    pub id: i64,
    pub text: String,
}

/// DTO for sending a question to clients, options included.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub question_type: String,
    pub answers: Vec<PublicAnswer>,
}

/// Full quiz payload for the quiz detail endpoint.
#[derive(Debug, Serialize)]
pub struct QuizDetail {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize)]
pub struct CreateQuizRequest {
    pub title: String,
    pub description: Option<String>,
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub quiz_id: i64,
    pub text: String,
    pub question_type: String,
}

/// DTO for creating a new answer option.
#[derive(Debug, Deserialize)]
pub struct CreateAnswerRequest {
    pub question_id: i64,
    pub text: String,
    /// Optional in the wire format so a missing flag reports as a field
    /// error rather than a deserialization failure.
    pub is_correct: Option<bool>,
}
