//! API request/response models for product pages.
//!
//! Admin and public endpoints share [`ProductResponse`]; child collections are always returned in
//! display order.

use super::{common::FaqInput, list_field, pagination::Pagination};
use crate::db::models::{
    common::Faq,
    products::{ProductDBResponse, ProductFeature, ProductWhyUs},
};
use crate::types::ProductId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductFeatureInput {
    pub section_title: Option<String>,
    pub section_subtitle: Option<String>,
    pub tab_label: String,
    pub content_title: String,
    pub content_description: Option<String>,
    pub image_url: Option<String>,
    /// JSON array or newline-separated text
    #[serde(default, deserialize_with = "list_field::entries")]
    pub benefits: Vec<String>,
    pub sequence: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductWhyUsInput {
    pub section_title: Option<String>,
    pub section_subtitle: Option<String>,
    pub card_label: Option<String>,
    pub icon: Option<String>,
    pub sequence: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductCreate {
    /// Derived from the name when omitted
    pub slug: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub hero_title: String,
    pub hero_subtitle: Option<String>,
    pub hero_image: Option<String>,
    pub cta_primary_text: Option<String>,
    pub cta_secondary_text: Option<String>,
    pub cta_image: Option<String>,
    #[serde(default)]
    pub features: Vec<ProductFeatureInput>,
    #[serde(default)]
    pub why_us: Vec<ProductWhyUsInput>,
    #[serde(default)]
    pub faqs: Vec<FaqInput>,
}

/// Omitted fields are left unchanged. A provided child array replaces the whole collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProductUpdate {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
    pub hero_image: Option<String>,
    pub cta_primary_text: Option<String>,
    pub cta_secondary_text: Option<String>,
    pub cta_image: Option<String>,
    pub features: Option<Vec<ProductFeatureInput>>,
    pub why_us: Option<Vec<ProductWhyUsInput>>,
    pub faqs: Option<Vec<FaqInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    #[schema(value_type = String, format = "uuid")]
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
    pub features: Vec<ProductFeature>,
    pub why_us: Vec<ProductWhyUs>,
    pub faqs: Vec<Faq>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductDBResponse> for ProductResponse {
    fn from(db: ProductDBResponse) -> Self {
        Self {
            id: db.id,
            slug: db.slug,
            name: db.name,
            category: db.category,
            hero_title: db.hero_title,
            hero_subtitle: db.hero_subtitle,
            hero_image: db.hero_image,
            cta_primary_text: db.cta_primary_text,
            cta_secondary_text: db.cta_secondary_text,
            cta_image: db.cta_image,
            features: db.features,
            why_us: db.why_us,
            faqs: db.faqs,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing products in the admin API
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListProductsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring match on name, slug and hero title
    pub search: Option<String>,

    /// Case-insensitive exact match on category
    pub category: Option<String>,
}

/// Query parameters for the public product list
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PublicProductsQuery {
    /// Case-insensitive exact match on category
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_accepts_benefits_as_text() {
        let create: ProductCreate = serde_json::from_value(json!({
            "name": "Cloud ERP",
            "hero_title": "Run your business",
            "features": [{
                "tab_label": "Finance",
                "content_title": "Close books faster",
                "benefits": "Automated journals\n\nBank reconciliation\n"
            }]
        }))
        .unwrap();

        assert!(create.slug.is_none());
        assert_eq!(create.features[0].benefits, vec!["Automated journals", "Bank reconciliation"]);
        assert!(create.why_us.is_empty());
        assert!(create.faqs.is_empty());
    }

    #[test]
    fn test_update_distinguishes_omitted_and_empty_collections() {
        let update: ProductUpdate = serde_json::from_value(json!({"faqs": []})).unwrap();
        assert!(update.features.is_none());
        assert_eq!(update.faqs.map(|f| f.len()), Some(0));
    }
}
