//! API request/response models for partner logos ("trusted by" strip).

use crate::db::models::social_trust::SocialTrustDBResponse;
use crate::types::SocialTrustId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Heading of the public partner-logo strip.
pub const SECTION_TITLE: &str = "Dipercaya oleh Perusahaan Terdepan di Indonesia";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SocialTrustCreate {
    pub name: String,
    pub logo_url: String,
    /// Defaults to the end of the list
    pub sequence: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SocialTrustUpdate {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    pub sequence: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SocialTrustResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: SocialTrustId,
    pub name: String,
    pub logo_url: String,
    pub sequence: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SocialTrustDBResponse> for SocialTrustResponse {
    fn from(db: SocialTrustDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            logo_url: db.logo_url,
            sequence: db.sequence,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// A partner logo as shown on the public site.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SocialTrustItem {
    #[schema(value_type = String, format = "uuid")]
    pub id: SocialTrustId,
    pub name: String,
    pub logo_url: String,
    pub sequence: i32,
}

impl From<SocialTrustDBResponse> for SocialTrustItem {
    fn from(db: SocialTrustDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            logo_url: db.logo_url,
            sequence: db.sequence,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SocialTrustSection {
    pub section_title: String,
    pub items: Vec<SocialTrustItem>,
}

impl SocialTrustSection {
    pub fn new(items: Vec<SocialTrustItem>) -> Self {
        Self {
            section_title: SECTION_TITLE.to_string(),
            items,
        }
    }
}
