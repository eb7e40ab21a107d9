//! Database models for service pages.

use crate::api::models::services::{MethodologyLayout, QuickStepLayout};
use crate::types::ServicePageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ServiceFocusItem {
    #[serde(skip)]
    pub service_page_id: ServicePageId,
    pub id: Uuid,
    pub card_title: String,
    pub card_desc: Option<String>,
    pub icon_image: Option<String>,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ServiceQuickStep {
    #[serde(skip)]
    pub service_page_id: ServicePageId,
    pub id: Uuid,
    pub step_label: Option<String>,
    pub step_title: String,
    pub step_desc: Option<String>,
    pub checklist: Vec<String>,
    pub step_order: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ServiceOffering {
    #[serde(skip)]
    pub service_page_id: ServicePageId,
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub checklist: Vec<String>,
    pub icon_image: Option<String>,
    pub highlight_badge: Option<String>,
    pub button_text: Option<String>,
    pub button_url: Option<String>,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ServiceMethodology {
    #[serde(skip)]
    pub service_page_id: ServicePageId,
    pub id: Uuid,
    pub phase_number: Option<String>,
    pub phase_title: String,
    pub phase_desc: Option<String>,
    pub icon_image: Option<String>,
    pub phase_order: i32,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ServiceCompetency {
    #[serde(skip)]
    pub service_page_id: ServicePageId,
    pub id: Uuid,
    pub skill_name: String,
    pub percentage_value: i32,
    pub rank_order: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct ServicePageDBResponse {
    pub id: ServicePageId,
    pub slug: String,
    pub page_name: String,
    pub hero_heading: String,
    pub hero_tagline: Option<String>,
    pub hero_bg_image: Option<String>,
    pub focus_section_tagline: Option<String>,
    pub focus_section_heading: Option<String>,
    pub focus_section_desc: Option<String>,
    pub quick_step_layout: QuickStepLayout,
    pub quick_step_heading: Option<String>,
    pub quick_step_subheading: Option<String>,
    pub quick_step_footer: Option<String>,
    pub offering_heading: Option<String>,
    pub offering_desc: Option<String>,
    pub methodology_layout: MethodologyLayout,
    pub methodology_heading: Option<String>,
    pub methodology_desc: Option<String>,
    pub methodology_footer: Option<String>,
    pub competency_heading: Option<String>,
    pub competency_desc: Option<String>,
    pub competency_footer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub focus_items: Vec<ServiceFocusItem>,
    #[sqlx(skip)]
    pub quick_steps: Vec<ServiceQuickStep>,
    #[sqlx(skip)]
    pub offerings: Vec<ServiceOffering>,
    #[sqlx(skip)]
    pub methodologies: Vec<ServiceMethodology>,
    #[sqlx(skip)]
    pub competencies: Vec<ServiceCompetency>,
}
