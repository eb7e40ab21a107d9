//! API request/response models for promotional banners.
//!
//! The admin API uses the column names; the public banner is served in the camelCase shape the
//! front-end component consumes.

use super::list_field;
use crate::db::models::promos::PromoDBResponse;
use crate::types::PromoId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromoCreate {
    #[serde(default)]
    pub is_active: bool,
    pub title: String,
    pub subtitle: Option<String>,
    pub cta_label: Option<String>,
    pub cta_link: Option<String>,
    pub promo_badge_line1: Option<String>,
    pub promo_badge_line2: Option<String>,
    pub promo_badge_label: Option<String>,
    /// JSON array or newline-separated text
    #[serde(default, deserialize_with = "list_field::entries")]
    pub features: Vec<String>,
    pub idle_bg_color: Option<String>,
    pub scroll_bg_color: Option<String>,
    pub illustration_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PromoUpdate {
    pub is_active: Option<bool>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub cta_label: Option<String>,
    pub cta_link: Option<String>,
    pub promo_badge_line1: Option<String>,
    pub promo_badge_line2: Option<String>,
    pub promo_badge_label: Option<String>,
    #[serde(default, deserialize_with = "list_field::optional_entries")]
    pub features: Option<Vec<String>>,
    pub idle_bg_color: Option<String>,
    pub scroll_bg_color: Option<String>,
    pub illustration_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromoResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PromoId,
    pub is_active: bool,
    pub title: String,
    pub subtitle: Option<String>,
    pub cta_label: Option<String>,
    pub cta_link: Option<String>,
    pub promo_badge_line1: Option<String>,
    pub promo_badge_line2: Option<String>,
    pub promo_badge_label: Option<String>,
    pub features: Vec<String>,
    pub idle_bg_color: Option<String>,
    pub scroll_bg_color: Option<String>,
    pub illustration_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PromoDBResponse> for PromoResponse {
    fn from(db: PromoDBResponse) -> Self {
        Self {
            id: db.id,
            is_active: db.is_active,
            title: db.title,
            subtitle: db.subtitle,
            cta_label: db.cta_label,
            cta_link: db.cta_link,
            promo_badge_line1: db.promo_badge_line1,
            promo_badge_line2: db.promo_badge_line2,
            promo_badge_label: db.promo_badge_label,
            features: db.features,
            idle_bg_color: db.idle_bg_color,
            scroll_bg_color: db.scroll_bg_color,
            illustration_url: db.illustration_url,
            image_url: db.image_url,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromoBadge {
    pub line1: String,
    pub line2: String,
    pub label: String,
}

/// The active promo banner as served to the public site.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicPromo {
    pub is_active: bool,
    pub title: String,
    pub subtitle: Option<String>,
    pub cta_label: Option<String>,
    pub cta_link: Option<String>,
    pub promo_badge: PromoBadge,
    pub features: Vec<String>,
    pub idle_bg: Option<String>,
    pub scroll_bg: Option<String>,
    pub illustration_url: Option<String>,
    pub image: Option<String>,
}

impl From<PromoDBResponse> for PublicPromo {
    fn from(db: PromoDBResponse) -> Self {
        Self {
            is_active: db.is_active,
            title: db.title,
            subtitle: db.subtitle,
            cta_label: db.cta_label,
            cta_link: db.cta_link,
            promo_badge: PromoBadge {
                line1: db.promo_badge_line1.unwrap_or_default(),
                line2: db.promo_badge_line2.unwrap_or_default(),
                label: db.promo_badge_label.unwrap_or_default(),
            },
            features: db.features,
            idle_bg: db.idle_bg_color,
            scroll_bg: db.scroll_bg_color,
            illustration_url: db.illustration_url,
            image: db.image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_public_promo_shape() {
        let now = Utc::now();
        let db = PromoDBResponse {
            id: Uuid::new_v4(),
            is_active: true,
            title: "Year-end sale".to_string(),
            subtitle: None,
            cta_label: Some("Book a demo".to_string()),
            cta_link: Some("/contact".to_string()),
            promo_badge_line1: Some("50%".to_string()),
            promo_badge_line2: None,
            promo_badge_label: None,
            features: vec!["Free onboarding".to_string()],
            idle_bg_color: Some("#fff".to_string()),
            scroll_bg_color: None,
            illustration_url: None,
            image_url: Some("https://blob.example/banner.png".to_string()),
            created_at: now,
            updated_at: now,
        };

        let body = serde_json::to_value(PublicPromo::from(db)).unwrap();
        assert_eq!(
            body,
            json!({
                "isActive": true,
                "title": "Year-end sale",
                "subtitle": null,
                "ctaLabel": "Book a demo",
                "ctaLink": "/contact",
                "promoBadge": {"line1": "50%", "line2": "", "label": ""},
                "features": ["Free onboarding"],
                "idleBg": "#fff",
                "scrollBg": null,
                "illustrationUrl": null,
                "image": "https://blob.example/banner.png"
            })
        );
    }

    #[test]
    fn test_create_defaults() {
        let create: PromoCreate = serde_json::from_value(json!({"title": "Promo", "features": "A\nB"})).unwrap();
        assert!(!create.is_active);
        assert_eq!(create.features, vec!["A", "B"]);
    }
}
