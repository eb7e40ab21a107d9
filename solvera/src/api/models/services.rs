//! API request/response models for service pages.
//!
//! A service page is a stack of optional sections. The public shape ([`PublicServicePage`])
//! omits a section entirely when it has no items, and renders the quick-step and methodology
//! items differently depending on the page's layout choice for that section.

use super::list_field;
use crate::db::models::services::{
    ServiceCompetency, ServiceFocusItem, ServiceMethodology, ServiceOffering, ServicePageDBResponse, ServiceQuickStep,
};
use crate::types::ServicePageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "quick_step_layout", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuickStepLayout {
    /// Horizontal numbered steps
    #[default]
    Steps,
    /// Cards with a checklist each
    StandardsGrid,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "methodology_layout", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MethodologyLayout {
    /// Vertical timeline with phase numbers
    #[default]
    Timeline,
    /// Icon grid of roles
    RolesGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FocusItemInput {
    pub card_title: String,
    pub card_desc: Option<String>,
    pub icon_image: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuickStepInput {
    pub step_label: Option<String>,
    pub step_title: String,
    pub step_desc: Option<String>,
    /// JSON array or newline-separated text
    #[serde(default, deserialize_with = "list_field::entries")]
    pub checklist: Vec<String>,
    pub step_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferingInput {
    pub title: String,
    pub description: Option<String>,
    /// JSON array or newline-separated text
    #[serde(default, deserialize_with = "list_field::entries")]
    pub checklist: Vec<String>,
    pub icon_image: Option<String>,
    pub highlight_badge: Option<String>,
    pub button_text: Option<String>,
    pub button_url: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MethodologyInput {
    pub phase_number: Option<String>,
    pub phase_title: String,
    pub phase_desc: Option<String>,
    pub icon_image: Option<String>,
    pub phase_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetencyInput {
    pub skill_name: String,
    /// 0 to 100
    pub percentage_value: i32,
    pub rank_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServicePageCreate {
    /// Derived from the page name when omitted
    pub slug: Option<String>,
    pub page_name: String,
    pub hero_heading: String,
    pub hero_tagline: Option<String>,
    pub hero_bg_image: Option<String>,
    pub focus_section_tagline: Option<String>,
    pub focus_section_heading: Option<String>,
    pub focus_section_desc: Option<String>,
    #[serde(default)]
    pub quick_step_layout: QuickStepLayout,
    pub quick_step_heading: Option<String>,
    pub quick_step_subheading: Option<String>,
    pub quick_step_footer: Option<String>,
    pub offering_heading: Option<String>,
    pub offering_desc: Option<String>,
    #[serde(default)]
    pub methodology_layout: MethodologyLayout,
    pub methodology_heading: Option<String>,
    pub methodology_desc: Option<String>,
    pub methodology_footer: Option<String>,
    pub competency_heading: Option<String>,
    pub competency_desc: Option<String>,
    pub competency_footer: Option<String>,
    #[serde(default)]
    pub focus_items: Vec<FocusItemInput>,
    #[serde(default)]
    pub quick_steps: Vec<QuickStepInput>,
    #[serde(default)]
    pub offerings: Vec<OfferingInput>,
    #[serde(default)]
    pub methodologies: Vec<MethodologyInput>,
    #[serde(default)]
    pub competencies: Vec<CompetencyInput>,
}

/// Omitted fields are left unchanged. A provided child array replaces the whole collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ServicePageUpdate {
    pub slug: Option<String>,
    pub page_name: Option<String>,
    pub hero_heading: Option<String>,
    pub hero_tagline: Option<String>,
    pub hero_bg_image: Option<String>,
    pub focus_section_tagline: Option<String>,
    pub focus_section_heading: Option<String>,
    pub focus_section_desc: Option<String>,
    pub quick_step_layout: Option<QuickStepLayout>,
    pub quick_step_heading: Option<String>,
    pub quick_step_subheading: Option<String>,
    pub quick_step_footer: Option<String>,
    pub offering_heading: Option<String>,
    pub offering_desc: Option<String>,
    pub methodology_layout: Option<MethodologyLayout>,
    pub methodology_heading: Option<String>,
    pub methodology_desc: Option<String>,
    pub methodology_footer: Option<String>,
    pub competency_heading: Option<String>,
    pub competency_desc: Option<String>,
    pub competency_footer: Option<String>,
    pub focus_items: Option<Vec<FocusItemInput>>,
    pub quick_steps: Option<Vec<QuickStepInput>>,
    pub offerings: Option<Vec<OfferingInput>>,
    pub methodologies: Option<Vec<MethodologyInput>>,
    pub competencies: Option<Vec<CompetencyInput>>,
}

/// Reject competency percentages outside 0..=100 before touching the database.
pub fn validate_competencies(competencies: &[CompetencyInput]) -> Result<(), String> {
    match competencies.iter().find(|c| !(0..=100).contains(&c.percentage_value)) {
        Some(c) => Err(format!(
            "Competency '{}' has percentage {}; expected a value from 0 to 100",
            c.skill_name, c.percentage_value
        )),
        None => Ok(()),
    }
}

/// Admin view of a service page: stored columns plus every collection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServicePageResponse {
    #[schema(value_type = String, format = "uuid")]
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
    pub focus_items: Vec<ServiceFocusItem>,
    pub quick_steps: Vec<ServiceQuickStep>,
    pub offerings: Vec<ServiceOffering>,
    pub methodologies: Vec<ServiceMethodology>,
    pub competencies: Vec<ServiceCompetency>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServicePageDBResponse> for ServicePageResponse {
    fn from(db: ServicePageDBResponse) -> Self {
        Self {
            id: db.id,
            slug: db.slug,
            page_name: db.page_name,
            hero_heading: db.hero_heading,
            hero_tagline: db.hero_tagline,
            hero_bg_image: db.hero_bg_image,
            focus_section_tagline: db.focus_section_tagline,
            focus_section_heading: db.focus_section_heading,
            focus_section_desc: db.focus_section_desc,
            quick_step_layout: db.quick_step_layout,
            quick_step_heading: db.quick_step_heading,
            quick_step_subheading: db.quick_step_subheading,
            quick_step_footer: db.quick_step_footer,
            offering_heading: db.offering_heading,
            offering_desc: db.offering_desc,
            methodology_layout: db.methodology_layout,
            methodology_heading: db.methodology_heading,
            methodology_desc: db.methodology_desc,
            methodology_footer: db.methodology_footer,
            competency_heading: db.competency_heading,
            competency_desc: db.competency_desc,
            competency_footer: db.competency_footer,
            focus_items: db.focus_items,
            quick_steps: db.quick_steps,
            offerings: db.offerings,
            methodologies: db.methodologies,
            competencies: db.competencies,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Hero {
    pub heading: String,
    pub tagline: Option<String>,
    pub bg_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FocusItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FocusSection {
    pub tagline: Option<String>,
    pub heading: Option<String>,
    pub description: Option<String>,
    pub items: Vec<FocusItem>,
}

/// A quick-step entry; the variant follows the section layout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuickStepItem {
    Step {
        id: Uuid,
        label: Option<String>,
        title: String,
        description: Option<String>,
    },
    StandardCard {
        id: Uuid,
        title: String,
        checklist: Vec<String>,
    },
}

impl QuickStepItem {
    fn render(step: ServiceQuickStep, layout: QuickStepLayout) -> Self {
        match layout {
            QuickStepLayout::Steps => QuickStepItem::Step {
                id: step.id,
                label: step.step_label,
                title: step.step_title,
                description: step.step_desc,
            },
            QuickStepLayout::StandardsGrid => QuickStepItem::StandardCard {
                id: step.id,
                title: step.step_title,
                checklist: step.checklist,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuickStepsSection {
    pub layout: QuickStepLayout,
    pub heading: Option<String>,
    pub subheading: Option<String>,
    pub footer: Option<String>,
    pub items: Vec<QuickStepItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferingButton {
    pub text: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferingItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub checklist: Vec<String>,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub button: Option<OfferingButton>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OfferingsSection {
    pub heading: Option<String>,
    pub description: Option<String>,
    pub items: Vec<OfferingItem>,
}

/// A methodology entry; the variant follows the section layout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MethodologyItem {
    TimelinePhase {
        id: Uuid,
        title: String,
        description: Option<String>,
        number: Option<String>,
    },
    RoleCard {
        id: Uuid,
        title: String,
        description: Option<String>,
        icon: Option<String>,
    },
}

impl MethodologyItem {
    fn render(phase: ServiceMethodology, layout: MethodologyLayout) -> Self {
        match layout {
            MethodologyLayout::Timeline => MethodologyItem::TimelinePhase {
                id: phase.id,
                title: phase.phase_title,
                description: phase.phase_desc,
                number: phase.phase_number,
            },
            MethodologyLayout::RolesGrid => MethodologyItem::RoleCard {
                id: phase.id,
                title: phase.phase_title,
                description: phase.phase_desc,
                icon: phase.icon_image,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MethodologySection {
    pub layout: MethodologyLayout,
    pub heading: Option<String>,
    pub description: Option<String>,
    pub footer: Option<String>,
    pub items: Vec<MethodologyItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetencyItem {
    pub id: Uuid,
    pub name: String,
    pub percentage: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetencySection {
    pub heading: Option<String>,
    pub description: Option<String>,
    pub footer: Option<String>,
    pub items: Vec<CompetencyItem>,
}

/// A service page shaped for the public site.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicServicePage {
    #[schema(value_type = String, format = "uuid")]
    pub id: ServicePageId,
    pub slug: String,
    pub page_name: String,
    pub hero: Hero,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_section: Option<FocusSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_steps_section: Option<QuickStepsSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offerings_section: Option<OfferingsSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methodology_section: Option<MethodologySection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competency_section: Option<CompetencySection>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServicePageDBResponse> for PublicServicePage {
    fn from(db: ServicePageDBResponse) -> Self {
        let focus_section = (!db.focus_items.is_empty()).then(|| FocusSection {
            tagline: db.focus_section_tagline,
            heading: db.focus_section_heading,
            description: db.focus_section_desc,
            items: db
                .focus_items
                .into_iter()
                .map(|item| FocusItem {
                    id: item.id,
                    title: item.card_title,
                    description: item.card_desc,
                    icon: item.icon_image,
                    order: item.display_order,
                })
                .collect(),
        });

        let quick_step_layout = db.quick_step_layout;
        let quick_steps_section = (!db.quick_steps.is_empty()).then(|| QuickStepsSection {
            layout: quick_step_layout,
            heading: db.quick_step_heading,
            subheading: db.quick_step_subheading,
            footer: db.quick_step_footer,
            items: db
                .quick_steps
                .into_iter()
                .map(|step| QuickStepItem::render(step, quick_step_layout))
                .collect(),
        });

        let offerings_section = (!db.offerings.is_empty()).then(|| OfferingsSection {
            heading: db.offering_heading,
            description: db.offering_desc,
            items: db
                .offerings
                .into_iter()
                .map(|offering| OfferingItem {
                    id: offering.id,
                    title: offering.title,
                    description: offering.description,
                    checklist: offering.checklist,
                    icon: offering.icon_image,
                    badge: offering.highlight_badge,
                    button: offering.button_text.map(|text| OfferingButton {
                        text,
                        url: offering.button_url,
                    }),
                })
                .collect(),
        });

        let methodology_layout = db.methodology_layout;
        let methodology_section = (!db.methodologies.is_empty()).then(|| MethodologySection {
            layout: methodology_layout,
            heading: db.methodology_heading,
            description: db.methodology_desc,
            footer: db.methodology_footer,
            items: db
                .methodologies
                .into_iter()
                .map(|phase| MethodologyItem::render(phase, methodology_layout))
                .collect(),
        });

        let competency_section = (!db.competencies.is_empty()).then(|| CompetencySection {
            heading: db.competency_heading,
            description: db.competency_desc,
            footer: db.competency_footer,
            items: db
                .competencies
                .into_iter()
                .map(|c| CompetencyItem {
                    id: c.id,
                    name: c.skill_name,
                    percentage: c.percentage_value,
                })
                .collect(),
        });

        Self {
            id: db.id,
            slug: db.slug,
            page_name: db.page_name,
            hero: Hero {
                heading: db.hero_heading,
                tagline: db.hero_tagline,
                bg_image: db.hero_bg_image,
            },
            focus_section,
            quick_steps_section,
            offerings_section,
            methodology_section,
            competency_section,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Public list of service pages.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServicePageList {
    pub items: Vec<PublicServicePage>,
    pub count: usize,
}
