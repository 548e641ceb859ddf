// src/handlers/event.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{core::events, error::AppError};

/// Query parameters for the upcoming-events listing.
#[derive(Debug, Deserialize)]
pub struct UpcomingParams {
    /// Override for the reference date; defaults to today (UTC).
    pub from: Option<chrono::NaiveDate>,
}

/// Lists events on or after the reference date, earliest first.
pub async fn list_upcoming(
    State(pool): State<SqlitePool>,
    Query(params): Query<UpcomingParams>,
) -> Result<impl IntoResponse, AppError> {
    let as_of = params.from.unwrap_or_else(|| chrono::Utc::now().date_naive());

    let events = events::upcoming_events(&pool, as_of).await.map_err(|e| {
        tracing::error!("Failed to list events: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(events))
}
