//! Database models for blog authors.

use crate::types::AuthorId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AuthorDBResponse {
    pub id: AuthorId,
    pub name: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
