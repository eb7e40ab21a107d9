//! Database models for users.

use crate::api::models::users::Role;
use crate::types::{AuthorId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub author_id: Option<AuthorId>,
}

/// Database request for updating a user
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    /// `Some(None)` unlinks the author profile
    pub author_id: Option<Option<AuthorId>>,
}

/// Database response for a user
#[derive(Debug, Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub author_id: Option<AuthorId>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
