// src/models/user.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Unique email address, stored lowercased.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// User role: 'user' or 'admin'.
    pub role: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("username regex"));

fn validate_username_chars(username: &str) -> Result<(), validator::ValidationError> {
    if USERNAME_RE.is_match(username) {
        return Ok(());
    }
    let mut err = validator::ValidationError::new("username_chars");
    err.message = Some("Username can only contain letters, numbers, and underscores.".into());
    Err(err)
}

fn validate_password_strength(password: &str) -> Result<(), validator::ValidationError> {
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if has_upper && has_lower && has_digit {
        return Ok(());
    }
    let mut err = validator::ValidationError::new("password_strength");
    err.message = Some(
        "Password must contain at least one uppercase letter, one lowercase letter, and one number."
            .into(),
    );
    Err(err)
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(
            min = 3,
            max = 150,
            message = "Username length must be between 3 and 150 characters."
        ),
        custom(function = validate_username_chars)
    )]
    pub username: String,
    #[validate(
        email(message = "Please enter a valid email address."),
        length(max = 254, message = "Email address is too long.")
    )]
    pub email: String,
    #[validate(
        length(
            min = 8,
            max = 128,
            message = "Password length must be between 8 and 128 characters."
        ),
        custom(function = validate_password_strength)
    )]
    pub password: String,
}

/// DTO for user login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
