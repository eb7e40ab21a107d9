//! API request/response models for blog authors.

use crate::db::models::authors::AuthorDBResponse;
use crate::types::AuthorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorCreate {
    pub name: String,
    pub photo_url: Option<String>,
}

/// Omitted fields are left unchanged; an empty `photo_url` removes the photo.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AuthorUpdate {
    pub name: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AuthorId,
    pub name: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AuthorDBResponse> for AuthorResponse {
    fn from(db: AuthorDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            photo_url: db.photo_url,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
