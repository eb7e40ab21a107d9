//! Slug allocation across every table that serves pages by slug.

use crate::db::errors::Result;
use crate::slugs;
use sqlx::PgConnection;
use std::collections::HashSet;
use std::fmt;
use tracing::instrument;
use uuid::Uuid;

/// Tables whose rows are addressed by slug. Slugs are unique across all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugTable {
    Products,
    Solutions,
    ServicePages,
    Articles,
}

impl SlugTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlugTable::Products => "products",
            SlugTable::Solutions => "solutions",
            SlugTable::ServicePages => "service_pages",
            SlugTable::Articles => "articles",
        }
    }
}

impl fmt::Display for SlugTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Slugs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Slugs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Slugs already in use that could collide with candidates for `base` (`base`, `base-N`).
    ///
    /// `exclude` names the row being updated so it never collides with itself.
    #[instrument(skip(self), fields(base = %base), err)]
    pub async fn taken_candidates(&mut self, base: &str, exclude: Option<(SlugTable, Uuid)>) -> Result<HashSet<String>> {
        // Base slugs only contain [a-z0-9-], so no LIKE escaping is needed.
        let prefix_pattern = format!("{base}-%");
        let (exclude_table, exclude_id) = match exclude {
            Some((table, id)) => (Some(table.as_str()), Some(id)),
            None => (None, None),
        };

        let taken: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT slug FROM (
                SELECT slug, 'products' AS owner, id FROM products
                UNION ALL SELECT slug, 'solutions', id FROM solutions
                UNION ALL SELECT slug, 'service_pages', id FROM service_pages
                UNION ALL SELECT slug, 'articles', id FROM articles
            ) slugged
            WHERE (slug = $1 OR slug LIKE $2)
              AND (owner, id) IS DISTINCT FROM ($3::text, $4::uuid)
            "#,
        )
        .bind(base)
        .bind(prefix_pattern)
        .bind(exclude_table)
        .bind(exclude_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(taken.into_iter().collect())
    }

    /// Allocate the first free candidate for `base`.
    ///
    /// Run inside the transaction that writes the slug; the unique indexes catch concurrent
    /// writers that pick the same candidate.
    pub async fn allocate(&mut self, base: &str, exclude: Option<(SlugTable, Uuid)>) -> Result<String> {
        let taken = self.taken_candidates(base, exclude).await?;
        Ok(slugs::resolve_unique(base, |candidate| taken.contains(candidate)))
    }
}
