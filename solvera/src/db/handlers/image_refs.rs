//! Collects every image URL the content tables still point at.

use crate::db::errors::Result;
use sqlx::PgConnection;
use tracing::instrument;

/// URL-valued columns that may reference stored images.
const IMAGE_COLUMNS: &[(&str, &str)] = &[
    ("articles", "image_url"),
    ("authors", "photo_url"),
    ("products", "hero_image"),
    ("products", "cta_image"),
    ("product_features", "image_url"),
    ("product_why_us", "icon"),
    ("solutions", "hero_image"),
    ("solutions", "cta_image"),
    ("solution_why_us", "icon"),
    ("solution_related_products", "icon_url"),
    ("service_pages", "hero_bg_image"),
    ("service_focus_items", "icon_image"),
    ("service_offerings", "icon_image"),
    ("service_methodologies", "icon_image"),
    ("social_trusts", "logo_url"),
    ("promos", "illustration_url"),
    ("promos", "image_url"),
];

pub struct ImageRefs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> ImageRefs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Distinct non-empty URLs stored in image columns.
    #[instrument(skip(self), err)]
    pub async fn column_urls(&mut self) -> Result<Vec<String>> {
        let sql = IMAGE_COLUMNS
            .iter()
            .map(|(table, column)| format!("SELECT {column} AS url FROM {table} WHERE {column} IS NOT NULL AND {column} <> ''"))
            .collect::<Vec<_>>()
            .join(" UNION ");

        let urls: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&mut *self.db).await?;
        Ok(urls)
    }

    /// HTML bodies of every article, for scanning inline images.
    #[instrument(skip(self), err)]
    pub async fn article_bodies(&mut self) -> Result<Vec<String>> {
        let bodies: Vec<String> = sqlx::query_scalar("SELECT content FROM articles WHERE content <> ''")
            .fetch_all(&mut *self.db)
            .await?;
        Ok(bodies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    #[test_log::test]
    async fn test_collects_urls_across_tables(pool: PgPool) {
        let author_id = Uuid::new_v4();
        sqlx::query("INSERT INTO authors (id, name, photo_url) VALUES ($1, 'Rina', 'https://blob.example/rina.png')")
            .bind(author_id)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO articles (id, author_id, title, slug, content, image_url) \
             VALUES ($1, $2, 'Hello', 'hello', '<img src=\"https://blob.example/inline.png\">', '')",
        )
        .bind(Uuid::new_v4())
        .bind(author_id)
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO social_trusts (id, name, logo_url) VALUES ($1, 'Acme', 'https://blob.example/rina.png')")
            .bind(Uuid::new_v4())
            .execute(&pool)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let mut refs = ImageRefs::new(&mut conn);

        // duplicates collapse and empty strings are ignored
        assert_eq!(refs.column_urls().await.unwrap(), vec!["https://blob.example/rina.png".to_string()]);

        let bodies = refs.article_bodies().await.unwrap();
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].contains("inline.png"));
    }
}
