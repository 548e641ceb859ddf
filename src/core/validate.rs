// src/core/validate.rs

use std::collections::HashMap;

use thiserror::Error;

use crate::models::quiz::{Answer, Question, QuestionKind};

/// Maximum length of a free-text answer, in characters.
pub const MAX_TEXT_ANSWER_LEN: usize = 1000;

/// A question together with its loaded answer options, as the validation
/// engine sees it. Built by the submission workflow from a single quiz.
#[derive(Debug, Clone)]
pub struct QuizQuestion {
    pub question: Question,
    pub answers: Vec<Answer>,
}

/// The checked outcome for a single question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// An MCQ selection, resolved against the question's own options.
    Selected { answer_id: i64, is_correct: bool },
    /// A free-text response. Carries no option reference and never scores.
    FreeText(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAnswer {
    pub question_id: i64,
    pub outcome: AnswerOutcome,
}

/// A raw answer mapping checked against a quiz's question set, in question
/// order, ready for scoring and persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAnswerSet {
    entries: Vec<ValidatedAnswer>,
}

impl ValidatedAnswerSet {
    pub fn entries(&self) -> &[ValidatedAnswer] {
        &self.entries
    }

    /// Count of questions whose selected option is correct. Free-text
    /// answers never contribute.
    pub fn score(&self) -> i64 {
        self.entries
            .iter()
            .filter(|entry| {
                matches!(entry.outcome, AnswerOutcome::Selected { is_correct: true, .. })
            })
            .count() as i64
    }
}

/// Rejection reasons, reported fail-fast: the first violated rule in
/// question order wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Too many answers provided. Please provide answers only for questions in this quiz.")]
    TooManyAnswers { expected: usize, got: usize },

    #[error("Missing answer for question {question_id}.")]
    MissingAnswer { question_id: i64 },

    #[error("Please provide an answer for question {question_id}.")]
    EmptyAnswer { question_id: i64 },

    #[error("Invalid answer for question {question_id}. Expected a positive numeric answer id.")]
    MalformedAnswerId { question_id: i64 },

    #[error("Selected answer does not exist for question {question_id}.")]
    UnknownAnswer { question_id: i64, answer_id: i64 },

    #[error("Selected answer does not belong to question {question_id}.")]
    AnswerQuestionMismatch { question_id: i64, answer_id: i64 },

    #[error("Text answer is too long. Maximum {MAX_TEXT_ANSWER_LEN} characters allowed for question {question_id}.")]
    TextTooLong { question_id: i64, len: usize },

    #[error("Unknown question type '{kind}' for question {question_id}.")]
    UnknownQuestionType { question_id: i64, kind: String },
}

/// Checks a raw answer mapping (question id -> raw value) against a quiz's
/// question set. Pure: no side effects, no persistence calls, identical
/// inputs yield identical results.
pub fn validate(
    questions: &[QuizQuestion],
    raw_answers: &HashMap<String, String>,
) -> Result<ValidatedAnswerSet, ValidationError> {
    // Guard against unrelated or injected keys.
    if raw_answers.len() > questions.len() {
        return Err(ValidationError::TooManyAnswers {
            expected: questions.len(),
            got: raw_answers.len(),
        });
    }

    let mut entries = Vec::with_capacity(questions.len());

    for quiz_question in questions {
        let question = &quiz_question.question;
        let question_id = question.id;

        let raw = raw_answers
            .get(&question_id.to_string())
            .ok_or(ValidationError::MissingAnswer { question_id })?;

        let value = raw.trim();
        if value.is_empty() {
            return Err(ValidationError::EmptyAnswer { question_id });
        }

        let kind = QuestionKind::parse(&question.question_type).ok_or_else(|| {
            ValidationError::UnknownQuestionType {
                question_id,
                kind: question.question_type.clone(),
            }
        })?;

        let outcome = match kind {
            QuestionKind::Mcq => {
                let answer_id = value
                    .parse::<i64>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or(ValidationError::MalformedAnswerId { question_id })?;

                match quiz_question.answers.iter().find(|a| a.id == answer_id) {
                    Some(answer) => AnswerOutcome::Selected {
                        answer_id: answer.id,
                        is_correct: answer.is_correct,
                    },
                    None => {
                        // Distinguish an option that belongs to a sibling
                        // question from one the quiz has never heard of.
                        let belongs_elsewhere = questions
                            .iter()
                            .any(|other| other.answers.iter().any(|a| a.id == answer_id));
                        if belongs_elsewhere {
                            return Err(ValidationError::AnswerQuestionMismatch {
                                question_id,
                                answer_id,
                            });
                        }
                        return Err(ValidationError::UnknownAnswer { question_id, answer_id });
                    }
                }
            }
            QuestionKind::Text => {
                let len = value.chars().count();
                if len > MAX_TEXT_ANSWER_LEN {
                    return Err(ValidationError::TextTooLong { question_id, len });
                }
                AnswerOutcome::FreeText(value.to_string())
            }
        };

        entries.push(ValidatedAnswer { question_id, outcome });
    }

    Ok(ValidatedAnswerSet { entries })
}
