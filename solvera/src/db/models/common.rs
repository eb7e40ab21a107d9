//! Row types shared by several page aggregates.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// FAQ row of a product or solution. `parent_id` is aliased from the owning FK column.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Faq {
    #[serde(skip)]
    pub parent_id: Uuid,
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub sequence: i32,
}
