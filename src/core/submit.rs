// src/core/submit.rs

use std::collections::HashMap;

use sqlx::SqlitePool;
use thiserror::Error;

use crate::core::validate::{self, AnswerOutcome, QuizQuestion, ValidationError};
use crate::models::quiz::{Answer, Question};
use crate::models::submission::{AnswerRecord, Submission, SubmissionDetail};

/// Failure taxonomy of the submission workflow, surfaced to both the form
/// and the JSON adapters.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Quiz does not exist.")]
    QuizNotFound,

    #[error("This quiz has no questions available.")]
    EmptyQuiz,

    #[error("You have already completed this quiz.")]
    DuplicateSubmission,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Turns a raw answer mapping into a persisted, scored submission.
///
/// Validation runs before anything is written, so a rejected attempt leaves
/// no rows behind. The duplicate check is re-enforced by the UNIQUE
/// (quiz_id, user_id) constraint at insert time, which turns a concurrent
/// race into a well-defined `DuplicateSubmission`.
pub async fn submit_quiz(
    pool: &SqlitePool,
    quiz_id: i64,
    user_id: i64,
    raw_answers: &HashMap<String, String>,
) -> Result<SubmissionDetail, SubmitError> {
    let quiz = sqlx::query_scalar::<_, i64>("SELECT id FROM quizzes WHERE id = ?")
        .bind(quiz_id)
        .fetch_optional(pool)
        .await?;
    if quiz.is_none() {
        return Err(SubmitError::QuizNotFound);
    }

    let questions = load_quiz_questions(pool, quiz_id).await?;
    if questions.is_empty() {
        return Err(SubmitError::EmptyQuiz);
    }

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM submissions WHERE quiz_id = ? AND user_id = ?",
    )
    .bind(quiz_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    if existing.is_some() {
        return Err(SubmitError::DuplicateSubmission);
    }

    let validated = validate::validate(&questions, raw_answers)?;
    let score = validated.score();

    let mut tx = pool.begin().await?;

    let submission = sqlx::query_as::<_, Submission>(
        r#"
        INSERT INTO submissions (quiz_id, user_id, score)
        VALUES (?, ?, ?)
        RETURNING id, quiz_id, user_id, score, submitted_at
        "#,
    )
    .bind(quiz_id)
    .bind(user_id)
    .bind(score)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
            SubmitError::DuplicateSubmission
        } else {
            SubmitError::Db(e)
        }
    })?;

    let mut answers = Vec::with_capacity(validated.entries().len());
    for entry in validated.entries() {
        let (answer_id, is_correct) = match &entry.outcome {
            AnswerOutcome::Selected { answer_id, is_correct } => (Some(*answer_id), *is_correct),
            AnswerOutcome::FreeText(_) => (None, false),
        };

        let record = sqlx::query_as::<_, AnswerRecord>(
            r#"
            INSERT INTO submission_answers (submission_id, question_id, answer_id, is_correct)
            VALUES (?, ?, ?, ?)
            RETURNING id, submission_id, question_id, answer_id, is_correct
            "#,
        )
        .bind(submission.id)
        .bind(entry.question_id)
        .bind(answer_id)
        .bind(is_correct)
        .fetch_one(&mut *tx)
        .await?;

        answers.push(record);
    }

    tx.commit().await?;

    tracing::info!(
        submission_id = submission.id,
        quiz_id,
        user_id,
        score,
        "quiz submitted"
    );

    Ok(SubmissionDetail { submission, answers })
}

/// Loads a quiz's questions in id order, each with its answer options.
pub async fn load_quiz_questions(
    pool: &SqlitePool,
    quiz_id: i64,
) -> Result<Vec<QuizQuestion>, sqlx::Error> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, text, question_type, created_at
        FROM questions
        WHERE quiz_id = ?
        ORDER BY id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
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
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let mut by_question: HashMap<i64, Vec<Answer>> = HashMap::new();
    for option in options {
        by_question.entry(option.question_id).or_default().push(option);
    }

    Ok(questions
        .into_iter()
        .map(|question| {
            let answers = by_question.remove(&question.id).unwrap_or_default();
            QuizQuestion { question, answers }
        })
        .collect())
}
