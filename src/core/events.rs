// src/core/events.rs

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::models::event::Event;

/// Events on or after `as_of`, earliest first. Each call is a fresh query.
pub async fn upcoming_events(
    pool: &SqlitePool,
    as_of: NaiveDate,
) -> Result<Vec<Event>, sqlx::Error> {
    sqlx::query_as::<_, Event>(
        r#"
        SELECT id, title, description, date, location
        FROM events
        WHERE date >= ?
        ORDER BY date ASC, id ASC
        "#,
    )
    .bind(as_of)
    .fetch_all(pool)
    .await
}
