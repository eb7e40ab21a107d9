//! API request/response models for blog categories.

use crate::db::models::categories::CategoryDBResponse;
use crate::types::CategoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCreate {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CategoryUpdate {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryDBResponse> for CategoryResponse {
    fn from(db: CategoryDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
