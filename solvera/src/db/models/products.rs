//! Database models for product pages.

use crate::db::models::common::Faq;
use crate::types::ProductId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One tab of a product's feature section.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ProductFeature {
    #[serde(skip)]
    pub product_id: ProductId,
    pub id: Uuid,
    pub section_title: Option<String>,
    pub section_subtitle: Option<String>,
    pub tab_label: String,
    pub content_title: String,
    pub content_description: Option<String>,
    pub image_url: Option<String>,
    pub benefits: Vec<String>,
    pub sequence: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ProductWhyUs {
    #[serde(skip)]
    pub product_id: ProductId,
    pub id: Uuid,
    pub section_title: Option<String>,
    pub section_subtitle: Option<String>,
    pub card_label: Option<String>,
    pub icon: Option<String>,
    pub sequence: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductDBResponse {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub category: Option<String>,
    pub hero_title: String,
    pub hero_subtitle: Option<String>,
    pub hero_image: Option<String>,
    pub cta_primary_text: Option<String>,
    pub cta_secondary_text: Option<String>,
    pub cta_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub features: Vec<ProductFeature>,
    #[sqlx(skip)]
    pub why_us: Vec<ProductWhyUs>,
    #[sqlx(skip)]
    pub faqs: Vec<Faq>,
}
