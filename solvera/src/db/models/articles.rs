//! Database models for blog articles.

use crate::types::{ArticleId, AuthorId, CategoryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone)]
pub struct ArticleCreateDBRequest {
    pub author_id: AuthorId,
    pub title: String,
    /// Explicit slug; derived from `title` when absent or blank
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub category_ids: Vec<CategoryId>,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleUpdateDBRequest {
    pub author_id: Option<AuthorId>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    /// `Some(None)` unpublishes
    pub published_at: Option<Option<DateTime<Utc>>>,
    /// Replaces the category set when present
    pub category_ids: Option<Vec<CategoryId>>,
}

/// A category attached to an article.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ArticleCategory {
    #[serde(skip)]
    pub article_id: ArticleId,
    #[schema(value_type = String, format = "uuid")]
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ArticleDBResponse {
    pub id: ArticleId,
    pub author_id: AuthorId,
    pub author_name: String,
    pub author_photo_url: Option<String>,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub categories: Vec<ArticleCategory>,
}
