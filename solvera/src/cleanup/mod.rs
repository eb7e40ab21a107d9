//! Orphaned image cleanup.
//!
//! Compares every file in blob storage against the URLs the content tables reference
//! (image columns plus `<img>` tags inside article bodies) and deletes the files nothing
//! points at anymore.

pub mod blob_store;
pub mod html;

use crate::db::{errors::DbError, handlers::image_refs::ImageRefs};
use blob_store::{BlobError, BlobStore};
use sqlx::PgConnection;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error("failed to list stored images: {0}")]
    List(#[source] BlobError),
}

/// Outcome of one cleanup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    /// Distinct image URLs referenced from the database
    pub active_images: usize,
    /// Files present in blob storage before deletion
    pub total_files: usize,
    /// Orphaned files that were removed (or would be, on a dry run)
    pub orphaned: Vec<String>,
    /// Files actually deleted; zero on a dry run or when deletion fails
    pub deleted: usize,
}

/// Every image URL the database still references.
pub async fn active_image_urls(conn: &mut PgConnection, public_host: &str) -> Result<HashSet<String>, DbError> {
    let mut refs = ImageRefs::new(conn);
    let mut active: HashSet<String> = refs.column_urls().await?.into_iter().collect();

    for body in refs.article_bodies().await? {
        active.extend(html::inline_image_urls(&body, public_host));
    }
    Ok(active)
}

/// Runs one cleanup pass.
///
/// A listing failure aborts the run. A deletion failure is logged and reported as zero
/// deletions so the caller still receives the computed statistics.
#[instrument(skip(conn, store), err)]
pub async fn run_cleanup(
    conn: &mut PgConnection,
    store: &dyn BlobStore,
    public_host: &str,
    dry_run: bool,
) -> Result<CleanupReport, CleanupError> {
    let active = active_image_urls(conn, public_host).await?;
    let stored = store.list().await.map_err(CleanupError::List)?;

    let orphaned: Vec<String> = stored
        .iter()
        .map(|blob| blob.url.clone())
        .filter(|url| !active.contains(url))
        .collect();

    let deleted = if dry_run || orphaned.is_empty() {
        0
    } else {
        match store.delete(&orphaned).await {
            Ok(()) => orphaned.len(),
            Err(e) => {
                error!(error = %e, count = orphaned.len(), "Failed to delete orphaned images");
                0
            }
        }
    };

    if dry_run && !orphaned.is_empty() {
        warn!(count = orphaned.len(), "Dry run: orphaned images left in place");
    }
    info!(
        active = active.len(),
        stored = stored.len(),
        orphaned = orphaned.len(),
        deleted,
        "Image cleanup complete"
    );

    Ok(CleanupReport {
        active_images: active.len(),
        total_files: stored.len(),
        orphaned,
        deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::blob_store::InMemoryBlobStore;
    use super::*;
    use sqlx::PgPool;
    use uuid::Uuid;

    const HOST: &str = "public.blob.vercel-storage.com";

    fn blob(name: &str) -> String {
        format!("https://x.{HOST}/{name}")
    }

    async fn seed(pool: &PgPool) {
        let author_id = Uuid::new_v4();
        sqlx::query("INSERT INTO authors (id, name, photo_url) VALUES ($1, 'Rina', $2)")
            .bind(author_id)
            .bind(blob("author.png"))
            .execute(pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO articles (id, author_id, title, slug, content, image_url) VALUES ($1, $2, 'Post', 'post', $3, $4)")
            .bind(Uuid::new_v4())
            .bind(author_id)
            .bind(format!(r#"<p>Body</p><img src="{}">"#, blob("inline.png")))
            .bind(blob("cover.png"))
            .execute(pool)
            .await
            .unwrap();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deletes_only_orphans(pool: PgPool) {
        seed(&pool).await;
        let store = InMemoryBlobStore::with_urls([
            blob("author.png"),
            blob("cover.png"),
            blob("inline.png"),
            blob("orphan-1.png"),
            blob("orphan-2.png"),
        ]);

        let mut conn = pool.acquire().await.unwrap();
        let report = run_cleanup(&mut conn, &store, HOST, false).await.unwrap();

        assert_eq!(report.active_images, 3);
        assert_eq!(report.total_files, 5);
        assert_eq!(report.orphaned, vec![blob("orphan-1.png"), blob("orphan-2.png")]);
        assert_eq!(report.deleted, 2);
        assert_eq!(store.urls(), vec![blob("author.png"), blob("cover.png"), blob("inline.png")]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_dry_run_keeps_files(pool: PgPool) {
        seed(&pool).await;
        let store = InMemoryBlobStore::with_urls([blob("cover.png"), blob("orphan.png")]);

        let mut conn = pool.acquire().await.unwrap();
        let report = run_cleanup(&mut conn, &store, HOST, true).await.unwrap();

        assert_eq!(report.orphaned, vec![blob("orphan.png")]);
        assert_eq!(report.deleted, 0);
        assert_eq!(store.urls().len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_failure_reports_zero(pool: PgPool) {
        let store = InMemoryBlobStore::with_urls([blob("orphan.png")]).failing_deletes();

        let mut conn = pool.acquire().await.unwrap();
        let report = run_cleanup(&mut conn, &store, HOST, false).await.unwrap();

        assert_eq!(report.active_images, 0);
        assert_eq!(report.orphaned.len(), 1);
        assert_eq!(report.deleted, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_inline_images_from_other_hosts_are_ignored(pool: PgPool) {
        let author_id = Uuid::new_v4();
        sqlx::query("INSERT INTO authors (id, name) VALUES ($1, 'Rina')")
            .bind(author_id)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO articles (id, author_id, title, slug, content) VALUES ($1, $2, 'Post', 'post', $3)")
            .bind(Uuid::new_v4())
            .bind(author_id)
            .bind(r#"<img src="https://cdn.other.com/pic.png">"#)
            .execute(&pool)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let active = active_image_urls(&mut conn, HOST).await.unwrap();
        assert!(active.is_empty());
    }
}
