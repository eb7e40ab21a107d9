//! Scheduled jobs triggered over HTTP by the hosting platform's cron.

use crate::{
    AppState,
    api::models::cleanup::{CleanupQuery, CleanupResponse},
    cleanup::{self, CleanupError},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header::AUTHORIZATION},
};

/// Accepts the request when no cron secret is configured, otherwise requires
/// `Authorization: Bearer {cron_secret}`.
fn authorize_cron(headers: &HeaderMap, cron_secret: Option<&str>) -> Result<()> {
    let Some(secret) = cron_secret.filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == secret => Ok(()),
        _ => Err(Error::Unauthenticated {
            message: Some("Unauthorized".to_string()),
        }),
    }
}

#[utoipa::path(
    get,
    path = "/cron/cleanup-images",
    tag = "cron",
    summary = "Delete orphaned images",
    description = "Deletes every stored blob that no content row references. With `dry_run=true` the orphans are only reported.",
    params(CleanupQuery),
    responses(
        (status = 200, description = "Cleanup finished", body = CleanupResponse),
        (status = 401, description = "Missing or wrong cron secret"),
        (status = 500, description = "Blob storage could not be listed"),
    ),
    security(
        ("CronSecret" = [])
    )
)]
#[tracing::instrument(skip_all, fields(dry_run = query.dry_run))]
pub async fn cleanup_images(
    State(state): State<AppState>,
    Query(query): Query<CleanupQuery>,
    headers: HeaderMap,
) -> Result<Json<CleanupResponse>> {
    authorize_cron(&headers, state.config.cron_secret.as_deref())?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let report = cleanup::run_cleanup(&mut conn, state.blob_store.as_ref(), &state.config.blob.public_host, query.dry_run)
        .await
        .map_err(|e| match e {
            CleanupError::Database(e) => Error::Database(e),
            CleanupError::List(e) => Error::Internal {
                operation: format!("list stored images: {e}"),
            },
        })?;

    Ok(Json(CleanupResponse::from_report(report, query.dry_run)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::blob_store::{BlobStore, InMemoryBlobStore};
    use crate::test_utils::{create_test_app_with, create_test_config};
    use axum::http::{HeaderValue, StatusCode};
    use serde_json::Value;
    use sqlx::PgPool;
    use std::sync::Arc;
    use uuid::Uuid;

    const HOST: &str = "public.blob.vercel-storage.com";

    fn blob(name: &str) -> String {
        format!("https://x.{HOST}/{name}")
    }

    async fn seed_author(pool: &PgPool, photo: &str) {
        sqlx::query("INSERT INTO authors (id, name, photo_url) VALUES ($1, 'Rina', $2)")
            .bind(Uuid::new_v4())
            .bind(photo)
            .execute(pool)
            .await
            .unwrap();
    }

    #[test]
    fn test_authorize_cron() {
        let mut headers = HeaderMap::new();
        assert!(authorize_cron(&headers, None).is_ok());
        assert!(authorize_cron(&headers, Some("")).is_ok());
        assert!(authorize_cron(&headers, Some("s3cret")).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer wrong"));
        assert!(authorize_cron(&headers, Some("s3cret")).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer s3cret"));
        assert!(authorize_cron(&headers, Some("s3cret")).is_ok());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cleanup_deletes_orphans(pool: PgPool) {
        seed_author(&pool, &blob("kept.png")).await;
        let store = Arc::new(InMemoryBlobStore::with_urls([blob("kept.png"), blob("orphan.png")]));
        let app = create_test_app_with(pool, create_test_config(), store.clone()).await;

        let response = app.get("/api/v1/cron/cleanup-images").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Cleanup execution complete");
        assert_eq!(body["stats"]["active_images_in_db"], 1);
        assert_eq!(body["stats"]["total_files_in_blob"], 2);
        assert_eq!(body["stats"]["deleted_files"], 1);
        assert_eq!(body["deleted_urls"], serde_json::json!([blob("orphan.png")]));
        assert_eq!(store.urls(), vec![blob("kept.png")]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_dry_run_keeps_files(pool: PgPool) {
        let store = Arc::new(InMemoryBlobStore::with_urls([blob("orphan.png")]));
        let app = create_test_app_with(pool, create_test_config(), store.clone()).await;

        let body: Value = app.get("/api/v1/cron/cleanup-images?dry_run=true").await.json();
        assert_eq!(body["dry_run"], true);
        assert_eq!(body["stats"]["deleted_files"], 0);
        assert_eq!(body["deleted_urls"].as_array().unwrap().len(), 1);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_failed_delete_reports_zero(pool: PgPool) {
        let store = Arc::new(InMemoryBlobStore::with_urls([blob("orphan.png")]).failing_deletes());
        let app = create_test_app_with(pool, create_test_config(), store).await;

        let response = app.get("/api/v1/cron/cleanup-images").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["stats"]["deleted_files"], 0);
        assert_eq!(body["stats"]["total_files_in_blob"], 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cron_secret_required_when_configured(pool: PgPool) {
        let mut config = create_test_config();
        config.cron_secret = Some("s3cret".to_string());
        let app = create_test_app_with(pool, config, Arc::new(InMemoryBlobStore::default())).await;

        app.get("/api/v1/cron/cleanup-images").await.assert_status(StatusCode::UNAUTHORIZED);
        app.get("/api/v1/cron/cleanup-images")
            .authorization_bearer("nope")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        app.get("/api/v1/cron/cleanup-images")
            .authorization_bearer("s3cret")
            .await
            .assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_listing_failure_is_500(pool: PgPool) {
        // the production store without a token cannot list
        let mut config = create_test_config();
        config.blob.token = None;
        crate::install_crypto_provider();
        let store = Arc::new(crate::cleanup::blob_store::VercelBlobStore::new(&config.blob).unwrap());
        let app = create_test_app_with(pool, config, store).await;

        let response = app.get("/api/v1/cron/cleanup-images").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.json::<Value>()["success"], false);
    }
}
