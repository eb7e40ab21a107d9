//! Database models for promotional banners.

use crate::types::PromoId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct PromoDBResponse {
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
