//! Database models for solution pages.

use crate::api::models::solutions::SectionType;
use crate::db::models::common::Faq;
use crate::types::{ProductId, SolutionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct SolutionFeature {
    #[serde(skip)]
    pub solution_id: SolutionId,
    pub id: Uuid,
    pub tab_label: Option<String>,
    pub content_title: Option<String>,
    pub content_description: Option<String>,
    pub benefits: Vec<String>,
    pub sequence: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct SolutionWhyUs {
    #[serde(skip)]
    pub solution_id: SolutionId,
    pub id: Uuid,
    pub section_type: SectionType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sequence: i32,
}

/// Link to a product, joined with the product's display fields.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct SolutionRelatedProduct {
    #[serde(skip)]
    pub solution_id: SolutionId,
    pub id: Uuid,
    #[schema(value_type = String, format = "uuid")]
    pub product_id: ProductId,
    pub product_name: Option<String>,
    pub product_subtitle: Option<String>,
    pub icon_url: Option<String>,
    pub sequence: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct SolutionDBResponse {
    pub id: SolutionId,
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
    pub features: Vec<SolutionFeature>,
    #[sqlx(skip)]
    pub why_us: Vec<SolutionWhyUs>,
    #[sqlx(skip)]
    pub related_products: Vec<SolutionRelatedProduct>,
    #[sqlx(skip)]
    pub faqs: Vec<Faq>,
}
