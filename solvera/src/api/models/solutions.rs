//! API request/response models for solution pages.
//!
//! The admin API returns the stored collections as-is. The public site gets [`PublicSolution`],
//! which regroups them into the page sections the front-end renders: feature tabs become
//! `core_benefits`, why-us rows are split by [`SectionType`], and related products become the
//! industry section.

use super::{common::FaqInput, list_field, pagination::Pagination, social_trust::SocialTrustItem};
use crate::db::models::{
    common::Faq,
    solutions::{SolutionDBResponse, SolutionFeature, SolutionRelatedProduct, SolutionWhyUs},
};
use crate::types::{ProductId, SolutionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const CORE_SOLUTION_TITLE: &str = "Keunggulan Solusi Kami";
pub const CORE_SOLUTION_SUBTITLE: &str = "Kami bantu tim sales bekerja lebih cepat, efisien, dan akurat dari awal hingga closing.";
pub const INDUSTRY_SECTION_TITLE: &str = "Industri Terkait";
pub const INDUSTRY_SECTION_SUBTITLE: &str = "Fleksibel untuk Berbagai Industri";

/// Which public section a why-us row is rendered in.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "why_us_section_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionType {
    #[default]
    Value,
    CoreSolution,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SolutionFeatureInput {
    pub tab_label: Option<String>,
    pub content_title: Option<String>,
    pub content_description: Option<String>,
    /// JSON array or newline-separated text
    #[serde(default, deserialize_with = "list_field::entries")]
    pub benefits: Vec<String>,
    pub sequence: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SolutionWhyUsInput {
    #[serde(default)]
    pub section_type: SectionType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sequence: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelatedProductInput {
    #[schema(value_type = String, format = "uuid")]
    pub product_id: ProductId,
    pub icon_url: Option<String>,
    pub sequence: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SolutionCreate {
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
    pub features: Vec<SolutionFeatureInput>,
    #[serde(default)]
    pub why_us: Vec<SolutionWhyUsInput>,
    #[serde(default)]
    pub related_products: Vec<RelatedProductInput>,
    #[serde(default)]
    pub faqs: Vec<FaqInput>,
}

/// Omitted fields are left unchanged. A provided child array replaces the whole collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SolutionUpdate {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
    pub hero_image: Option<String>,
    pub cta_primary_text: Option<String>,
    pub cta_secondary_text: Option<String>,
    pub cta_image: Option<String>,
    pub features: Option<Vec<SolutionFeatureInput>>,
    pub why_us: Option<Vec<SolutionWhyUsInput>>,
    pub related_products: Option<Vec<RelatedProductInput>>,
    pub faqs: Option<Vec<FaqInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SolutionResponse {
    #[schema(value_type = String, format = "uuid")]
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
    pub features: Vec<SolutionFeature>,
    pub why_us: Vec<SolutionWhyUs>,
    pub related_products: Vec<SolutionRelatedProduct>,
    pub faqs: Vec<Faq>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SolutionDBResponse> for SolutionResponse {
    fn from(db: SolutionDBResponse) -> Self {
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
            related_products: db.related_products,
            faqs: db.faqs,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing solutions in the admin API
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListSolutionsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring match on name, hero title and slug
    pub search: Option<String>,

    /// Case-insensitive exact match on category
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoreBenefit {
    pub id: Uuid,
    pub tab_label: Option<String>,
    pub content_title: Option<String>,
    pub content_description: Option<String>,
    pub values: Vec<String>,
    pub sequence: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoreValue {
    pub id: Uuid,
    pub icon: Option<String>,
    pub icon_title: Option<String>,
    pub icon_description: Option<String>,
    pub sequence: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoreSolutionItem {
    pub id: Uuid,
    pub icon: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub sequence: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoreSolutionSection {
    pub section_title: String,
    pub section_subtitle: String,
    pub items: Vec<CoreSolutionItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IndustryItem {
    #[schema(value_type = String, format = "uuid")]
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub sequence: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IndustrySection {
    pub section_title: String,
    pub section_subtitle: String,
    pub industries: Vec<IndustryItem>,
}

/// A solution page shaped for the public site.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicSolution {
    #[schema(value_type = String, format = "uuid")]
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
    pub core_benefits: Vec<CoreBenefit>,
    pub core_values: Vec<CoreValue>,
    pub core_solution: CoreSolutionSection,
    pub industry_section: IndustrySection,
    pub faqs: Vec<Faq>,
    pub trusted_by: Vec<SocialTrustItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PublicSolution {
    /// Shape a stored solution. `trusted_by` is the site-wide partner strip.
    pub fn shape(db: SolutionDBResponse, trusted_by: Vec<SocialTrustItem>) -> Self {
        let core_benefits = db
            .features
            .into_iter()
            .map(|f| CoreBenefit {
                id: f.id,
                tab_label: f.tab_label,
                content_title: f.content_title,
                content_description: f.content_description,
                values: f.benefits,
                sequence: f.sequence,
            })
            .collect();

        let (values, core_solutions): (Vec<_>, Vec<_>) =
            db.why_us.into_iter().partition(|w| w.section_type == SectionType::Value);

        let core_values = values
            .into_iter()
            .map(|w| CoreValue {
                id: w.id,
                icon: w.icon,
                icon_title: w.title,
                icon_description: w.description,
                sequence: w.sequence,
            })
            .collect();

        let core_solution_items = core_solutions
            .into_iter()
            .map(|w| CoreSolutionItem {
                id: w.id,
                icon: w.icon,
                title: w.title,
                description: w.description,
                sequence: w.sequence,
            })
            .collect();

        // links whose product row is gone have no name to show
        let industries = db
            .related_products
            .into_iter()
            .filter_map(|link| {
                link.product_name.map(|name| IndustryItem {
                    id: link.product_id,
                    name,
                    description: link.product_subtitle,
                    sequence: link.sequence,
                })
            })
            .collect();

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
            core_benefits,
            core_values,
            core_solution: CoreSolutionSection {
                section_title: CORE_SOLUTION_TITLE.to_string(),
                section_subtitle: CORE_SOLUTION_SUBTITLE.to_string(),
                items: core_solution_items,
            },
            industry_section: IndustrySection {
                section_title: INDUSTRY_SECTION_TITLE.to_string(),
                section_subtitle: INDUSTRY_SECTION_SUBTITLE.to_string(),
                industries,
            },
            faqs: db.faqs,
            trusted_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn why_us(solution_id: Uuid, section_type: SectionType, title: &str, sequence: i32) -> SolutionWhyUs {
        SolutionWhyUs {
            solution_id,
            id: Uuid::new_v4(),
            section_type,
            title: Some(title.to_string()),
            description: Some(format!("{title} description")),
            icon: None,
            sequence,
        }
    }

    fn solution() -> SolutionDBResponse {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let product_id = Uuid::new_v4();
        SolutionDBResponse {
            id,
            slug: "sales-automation".to_string(),
            name: "Sales Automation".to_string(),
            category: None,
            hero_title: "Close faster".to_string(),
            hero_subtitle: None,
            hero_image: None,
            cta_primary_text: None,
            cta_secondary_text: None,
            cta_image: None,
            created_at: now,
            updated_at: now,
            features: vec![SolutionFeature {
                solution_id: id,
                id: Uuid::new_v4(),
                tab_label: Some("Pipeline".to_string()),
                content_title: None,
                content_description: None,
                benefits: vec!["Forecasts".to_string()],
                sequence: 1,
            }],
            why_us: vec![
                why_us(id, SectionType::Value, "Trusted", 1),
                why_us(id, SectionType::CoreSolution, "Integrated", 2),
                why_us(id, SectionType::Value, "Local", 3),
            ],
            related_products: vec![
                SolutionRelatedProduct {
                    solution_id: id,
                    id: Uuid::new_v4(),
                    product_id,
                    product_name: Some("Cloud ERP".to_string()),
                    product_subtitle: Some("All-in-one".to_string()),
                    icon_url: None,
                    sequence: 4,
                },
                SolutionRelatedProduct {
                    solution_id: id,
                    id: Uuid::new_v4(),
                    product_id: Uuid::new_v4(),
                    product_name: None,
                    product_subtitle: None,
                    icon_url: None,
                    sequence: 5,
                },
            ],
            faqs: vec![],
        }
    }

    #[test]
    fn test_shape_regroups_sections() {
        let shaped = PublicSolution::shape(solution(), vec![]);
        let body = serde_json::to_value(&shaped).unwrap();

        assert_eq!(body["core_benefits"][0]["values"], json!(["Forecasts"]));
        assert_eq!(body["core_values"].as_array().unwrap().len(), 2);
        assert_eq!(body["core_values"][0]["icon_title"], "Trusted");
        assert_eq!(body["core_values"][1]["icon_description"], "Local description");

        assert_eq!(body["core_solution"]["section_title"], CORE_SOLUTION_TITLE);
        assert_eq!(body["core_solution"]["section_subtitle"], CORE_SOLUTION_SUBTITLE);
        assert_eq!(body["core_solution"]["items"][0]["title"], "Integrated");

        let industries = body["industry_section"]["industries"].as_array().unwrap();
        assert_eq!(industries.len(), 1);
        assert_eq!(industries[0]["name"], "Cloud ERP");
        assert_eq!(industries[0]["description"], "All-in-one");
        assert_eq!(industries[0]["sequence"], 4);
        assert_eq!(body["industry_section"]["section_title"], INDUSTRY_SECTION_TITLE);
        assert_eq!(body["trusted_by"], json!([]));
    }

    #[test]
    fn test_section_type_wire_format() {
        assert_eq!(serde_json::to_value(SectionType::CoreSolution).unwrap(), json!("CORE_SOLUTION"));
        let input: SolutionWhyUsInput = serde_json::from_value(json!({"title": "x"})).unwrap();
        assert_eq!(input.section_type, SectionType::Value);
    }
}
