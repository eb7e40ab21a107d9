//! Database models for partner logos.

use crate::types::SocialTrustId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct SocialTrustDBResponse {
    pub id: SocialTrustId,
    pub name: String,
    pub logo_url: String,
    pub sequence: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
