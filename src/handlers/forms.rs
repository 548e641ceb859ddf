// src/handlers/forms.rs
//
// Form-based presentation adapter. HTML rendering itself lives with the
// template collaborator; these handlers only translate form posts into core
// calls and core outcomes into redirects plus a human-readable flash cookie.

use std::collections::HashMap;

use axum::{
    Extension, Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use sqlx::SqlitePool;

use crate::{
    core::submit::{self, SubmitError},
    error::AppError,
    utils::jwt::Claims,
};

/// Name prefix the quiz form uses for its per-question fields.
const QUESTION_FIELD_PREFIX: &str = "question_";

fn flash(message: impl Into<String>) -> Cookie<'static> {
    Cookie::build(("flash", message.into())).path("/").build()
}

/// Submits a quiz attempt posted as an HTML form with fields named
/// `question_<id>`. Calls the same submission workflow as the JSON API.
pub async fn submit_quiz_form(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    jar: CookieJar,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let answers: HashMap<String, String> = fields
        .into_iter()
        .filter_map(|(name, value)| {
            name.strip_prefix(QUESTION_FIELD_PREFIX)
                .map(|question_id| (question_id.to_string(), value))
        })
        .collect();

    match submit::submit_quiz(&pool, quiz_id, user_id, &answers).await {
        Ok(detail) => Ok((
            jar.add(flash("Quiz submitted successfully")),
            Redirect::to(&format!("/quizzes/results/{}", detail.submission.id)),
        )),
        // Matches the quiz-list redirect users get when reopening a
        // completed quiz.
        Err(SubmitError::DuplicateSubmission) => Ok((
            jar.add(flash("You have already completed this quiz.")),
            Redirect::to("/quizzes"),
        )),
        Err(err @ (SubmitError::EmptyQuiz | SubmitError::Invalid(_))) => Ok((
            jar.add(flash(err.to_string())),
            Redirect::to(&format!("/quizzes/{quiz_id}")),
        )),
        Err(SubmitError::QuizNotFound) => {
            Err(AppError::NotFound("Quiz not found".to_string()))
        }
        Err(SubmitError::Db(e)) => Err(AppError::from(e)),
    }
}
