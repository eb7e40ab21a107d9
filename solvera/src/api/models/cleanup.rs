//! Request/response models for the image cleanup cron endpoint.

use crate::cleanup::CleanupReport;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CleanupQuery {
    /// Report orphaned files without deleting them
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CleanupStats {
    pub active_images_in_db: usize,
    pub total_files_in_blob: usize,
    pub deleted_files: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CleanupResponse {
    pub success: bool,
    pub message: String,
    pub dry_run: bool,
    pub stats: CleanupStats,
    /// Orphaned URLs; on a dry run these were left in place
    pub deleted_urls: Vec<String>,
}

impl CleanupResponse {
    pub fn from_report(report: CleanupReport, dry_run: bool) -> Self {
        Self {
            success: true,
            message: "Cleanup execution complete".to_string(),
            dry_run,
            stats: CleanupStats {
                active_images_in_db: report.active_images,
                total_files_in_blob: report.total_files,
                deleted_files: report.deleted,
            },
            deleted_urls: report.orphaned,
        }
    }
}
