//! API request/response models for blog articles.

use super::pagination::Pagination;
use crate::db::models::articles::{ArticleCategory, ArticleDBResponse};
use crate::types::{ArticleId, AuthorId, CategoryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Default number of articles on the public blog feed.
pub const PUBLIC_DEFAULT_LIMIT: i64 = 5;

/// Upper bound for the public blog feed.
pub const PUBLIC_MAX_LIMIT: i64 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleCreate {
    pub title: String,
    /// Derived from the title when omitted
    pub slug: Option<String>,
    pub summary: Option<String>,
    /// HTML body
    pub content: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    /// Required for admins. Editors always write under their own author profile.
    #[schema(value_type = Option<String>, format = "uuid")]
    pub author_id: Option<AuthorId>,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub category_ids: Vec<CategoryId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    /// `null` unpublishes; omitting the field leaves it unchanged.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub published_at: Option<Option<DateTime<Utc>>>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub author_id: Option<AuthorId>,
    /// Replaces the article's categories when present
    #[schema(value_type = Option<Vec<String>>)]
    pub category_ids: Option<Vec<CategoryId>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArticleResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ArticleId,
    #[schema(value_type = String, format = "uuid")]
    pub author_id: AuthorId,
    pub author_name: String,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub categories: Vec<ArticleCategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleDBResponse> for ArticleResponse {
    fn from(db: ArticleDBResponse) -> Self {
        Self {
            id: db.id,
            author_id: db.author_id,
            author_name: db.author_name,
            title: db.title,
            slug: db.slug,
            summary: db.summary,
            content: db.content,
            image_url: db.image_url,
            published_at: db.published_at,
            categories: db.categories,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing articles in the admin API
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListArticlesQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring match on title, slug, summary and content
    pub search: Option<String>,

    /// Only articles tagged with this category
    #[param(value_type = Option<String>, format = "uuid")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub category_id: Option<CategoryId>,
}

/// Query parameters for the public blog feed
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PublicArticlesQuery {
    /// Number of articles (default: 5, max: 50)
    #[param(default = 5, minimum = 1, maximum = 50)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}

impl PublicArticlesQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(PUBLIC_DEFAULT_LIMIT).clamp(1, PUBLIC_MAX_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Publisher {
    #[schema(value_type = String, format = "uuid")]
    pub id: AuthorId,
    pub name: String,
    pub photo_url: Option<String>,
}

/// Article as served to the public site.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicArticle {
    #[schema(value_type = String, format = "uuid")]
    pub id: ArticleId,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub publisher: Publisher,
    pub categories: Vec<ArticleCategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleDBResponse> for PublicArticle {
    fn from(db: ArticleDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            slug: db.slug,
            summary: db.summary,
            content: db.content,
            image_url: db.image_url,
            published_at: db.published_at,
            publisher: Publisher {
                id: db.author_id,
                name: db.author_name,
                photo_url: db.author_photo_url,
            },
            categories: db.categories,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
