// src/models/event.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'events' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date: chrono::NaiveDate,
    pub location: String,
}

/// DTO for creating a new event.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    /// Optional in the wire format so a missing date reports as a field
    /// error rather than a deserialization failure.
    pub date: Option<chrono::NaiveDate>,
    pub location: String,
}
