//! Database repository for blog articles.
//!
//! Articles are read joined with their author and category names. Slugs are allocated through
//! [`Slugs`] inside the same transaction as the write.

use crate::db::{
    errors::{DbError, Result},
    handlers::{
        repository::Repository,
        slugs::{SlugTable, Slugs},
        utils::{group_by_parent, push_search},
    },
    models::articles::{ArticleCategory, ArticleCreateDBRequest, ArticleDBResponse, ArticleUpdateDBRequest},
};
use crate::slugs;
use crate::types::{ArticleId, AuthorId, CategoryId, abbrev_uuid};
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

const SELECT_ARTICLES: &str = "SELECT a.*, au.name AS author_name, au.photo_url AS author_photo_url \
     FROM articles a JOIN authors au ON au.id = a.author_id";

/// Filter for listing articles
#[derive(Debug, Clone)]
pub struct ArticleFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Restrict to one author's articles. Editors are always scoped this way.
    pub author_id: Option<AuthorId>,
}

impl ArticleFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            search: None,
            category_id: None,
            author_id: None,
        }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_author(mut self, author_id: AuthorId) -> Self {
        self.author_id = Some(author_id);
        self
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(author_id) = self.author_id {
            query.push(" AND a.author_id = ");
            query.push_bind(author_id);
        }
        if let Some(category_id) = self.category_id {
            query.push(" AND EXISTS (SELECT 1 FROM article_categories ac WHERE ac.article_id = a.id AND ac.category_id = ");
            query.push_bind(category_id);
            query.push(")");
        }
        if let Some(ref search) = self.search {
            push_search(query, &["a.title", "a.slug", "a.summary", "a.content"], search);
        }
    }
}

pub struct Articles<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Articles<'c> {
    type CreateRequest = ArticleCreateDBRequest;
    type UpdateRequest = ArticleUpdateDBRequest;
    type Response = ArticleDBResponse;
    type Id = ArticleId;
    type Filter = ArticleFilter;

    #[instrument(skip(self, request), fields(title = %request.title, author_id = %abbrev_uuid(&request.author_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();
        {
            let mut tx = self.db.begin().await?;

            let base = slugs::requested_base(request.slug.as_deref(), &request.title);
            let slug = Slugs::new(&mut tx).allocate(&base, None).await?;

            sqlx::query(
                r#"
                INSERT INTO articles (id, author_id, title, slug, summary, content, image_url, published_at, slug_is_custom)
                VALUES ($1, $2, $3, $4, NULLIF($5, ''), $6, NULLIF($7, ''), $8, $9)
                "#,
            )
            .bind(id)
            .bind(request.author_id)
            .bind(request.title.trim())
            .bind(&slug)
            .bind(&request.summary)
            .bind(&request.content)
            .bind(&request.image_url)
            .bind(request.published_at)
            .bind(slugs::is_explicit(request.slug.as_deref()))
            .execute(&mut *tx)
            .await?;

            replace_categories(&mut tx, id, &request.category_ids).await?;
            tx.commit().await?;
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(article_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let article = sqlx::query_as::<_, ArticleDBResponse>(&format!("{SELECT_ARTICLES} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        match article {
            Some(article) => Ok(self.with_categories(vec![article]).await?.pop()),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let articles = sqlx::query_as::<_, ArticleDBResponse>(&format!("{SELECT_ARTICLES} WHERE a.id = ANY($1)"))
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        let articles = self.with_categories(articles).await?;
        Ok(articles.into_iter().map(|a| (a.id, a)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new(SELECT_ARTICLES);
        query.push(" WHERE 1=1");
        filter.push_conditions(&mut query);

        query.push(" ORDER BY COALESCE(a.published_at, a.created_at) DESC, a.id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let articles = query.build_query_as::<ArticleDBResponse>().fetch_all(&mut *self.db).await?;
        self.with_categories(articles).await
    }

    #[instrument(skip(self), fields(article_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(article_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        {
            let mut tx = self.db.begin().await?;

            let (old_title, slug_is_custom): (String, bool) = sqlx::query_as("SELECT title, slug_is_custom FROM articles WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(DbError::NotFound)?;

            let new_title = request.title.as_deref().map(str::trim);
            let slug = if slugs::needs_recompute(request.slug.as_deref(), &old_title, new_title, slug_is_custom) {
                let base = slugs::requested_base(request.slug.as_deref(), new_title.unwrap_or(&old_title));
                Some(Slugs::new(&mut tx).allocate(&base, Some((SlugTable::Articles, id))).await?)
            } else {
                None
            };

            let (set_published, published_at) = match request.published_at {
                Some(published_at) => (true, published_at),
                None => (false, None),
            };

            sqlx::query(
                r#"
                UPDATE articles SET
                    author_id = COALESCE($2, author_id),
                    title = COALESCE($3, title),
                    slug = COALESCE($4, slug),
                    slug_is_custom = slug_is_custom OR $10,
                    summary = CASE WHEN $5::text IS NULL THEN summary ELSE NULLIF($5, '') END,
                    content = COALESCE($6, content),
                    image_url = CASE WHEN $7::text IS NULL THEN image_url ELSE NULLIF($7, '') END,
                    published_at = CASE WHEN $8 THEN $9 ELSE published_at END,
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(request.author_id)
            .bind(new_title)
            .bind(&slug)
            .bind(&request.summary)
            .bind(&request.content)
            .bind(&request.image_url)
            .bind(set_published)
            .bind(published_at)
            .bind(slugs::is_explicit(request.slug.as_deref()))
            .execute(&mut *tx)
            .await?;

            if let Some(ref category_ids) = request.category_ids {
                replace_categories(&mut tx, id, category_ids).await?;
            }

            tx.commit().await?;
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }
}

async fn replace_categories(conn: &mut PgConnection, article_id: ArticleId, category_ids: &[CategoryId]) -> Result<()> {
    sqlx::query("DELETE FROM article_categories WHERE article_id = $1")
        .bind(article_id)
        .execute(&mut *conn)
        .await?;

    if !category_ids.is_empty() {
        sqlx::query(
            "INSERT INTO article_categories (article_id, category_id) \
             SELECT $1, category_id FROM UNNEST($2::uuid[]) AS category_id ON CONFLICT DO NOTHING",
        )
        .bind(article_id)
        .bind(category_ids)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

impl<'c> Articles<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Count articles matching the filter
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &ArticleFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM articles a WHERE 1=1");
        filter.push_conditions(&mut query);

        let count: (i64,) = query.build_query_as().fetch_one(&mut *self.db).await?;
        Ok(count.0)
    }

    #[instrument(skip(self), fields(slug = %slug), err)]
    pub async fn get_by_slug(&mut self, slug: &str) -> Result<Option<ArticleDBResponse>> {
        let article = sqlx::query_as::<_, ArticleDBResponse>(&format!("{SELECT_ARTICLES} WHERE a.slug = $1"))
            .bind(slug)
            .fetch_optional(&mut *self.db)
            .await?;

        match article {
            Some(article) => Ok(self.with_categories(vec![article]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn with_categories(&mut self, mut articles: Vec<ArticleDBResponse>) -> Result<Vec<ArticleDBResponse>> {
        if articles.is_empty() {
            return Ok(articles);
        }

        let ids: Vec<ArticleId> = articles.iter().map(|a| a.id).collect();
        let rows = sqlx::query_as::<_, ArticleCategory>(
            r#"
            SELECT ac.article_id, c.id, c.name
            FROM article_categories ac
            JOIN categories c ON c.id = ac.category_id
            WHERE ac.article_id = ANY($1)
            ORDER BY c.name, c.id
            "#,
        )
        .bind(ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut by_article = group_by_parent(rows, |row| row.article_id);
        for article in &mut articles {
            article.categories = by_article.remove(&article.id).unwrap_or_default();
        }
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    async fn author(pool: &PgPool, name: &str) -> AuthorId {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO authors (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await
            .unwrap();
        id
    }

    async fn category(pool: &PgPool, name: &str) -> CategoryId {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await
            .unwrap();
        id
    }

    fn create_request(author_id: AuthorId, title: &str) -> ArticleCreateDBRequest {
        ArticleCreateDBRequest {
            author_id,
            title: title.to_string(),
            slug: None,
            summary: None,
            content: "<p>Hello</p>".to_string(),
            image_url: None,
            published_at: None,
            category_ids: vec![],
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_derives_unique_slug(pool: PgPool) {
        let author_id = author(&pool, "Rina").await;
        let tips = category(&pool, "Tips").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Articles::new(&mut conn);

        let mut request = create_request(author_id, "Digital Transformation 101");
        request.category_ids = vec![tips];
        let first = repo.create(&request).await.unwrap();
        assert_eq!(first.slug, "digital-transformation-101");
        assert_eq!(first.author_name, "Rina");
        assert_eq!(first.categories.len(), 1);
        assert_eq!(first.categories[0].name, "Tips");

        let second = repo.create(&create_request(author_id, "Digital Transformation 101!")).await.unwrap();
        assert_eq!(second.slug, "digital-transformation-101-1");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_scoped_by_author_and_category(pool: PgPool) {
        let rina = author(&pool, "Rina").await;
        let budi = author(&pool, "Budi").await;
        let tips = category(&pool, "Tips").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Articles::new(&mut conn);

        let mut tagged = create_request(rina, "Rina on ERP");
        tagged.category_ids = vec![tips];
        repo.create(&tagged).await.unwrap();
        repo.create(&create_request(rina, "Rina on HR")).await.unwrap();
        repo.create(&create_request(budi, "Budi on CRM")).await.unwrap();

        let own = ArticleFilter::new(0, 10).with_author(rina);
        assert_eq!(repo.list(&own).await.unwrap().len(), 2);
        assert_eq!(repo.count(&own).await.unwrap(), 2);

        let tagged_only = ArticleFilter::new(0, 10).with_category(tips);
        let found = repo.list(&tagged_only).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Rina on ERP");

        let searched = ArticleFilter::new(0, 10).with_search("crm".to_string());
        assert_eq!(repo.count(&searched).await.unwrap(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_keeps_hand_picked_slug_and_replaces_categories(pool: PgPool) {
        let author_id = author(&pool, "Rina").await;
        let tips = category(&pool, "Tips").await;
        let news = category(&pool, "News").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Articles::new(&mut conn);

        let mut request = create_request(author_id, "Original Title");
        request.slug = Some("Launch Day".to_string());
        request.category_ids = vec![tips];
        let article = repo.create(&request).await.unwrap();
        assert_eq!(article.slug, "launch-day");

        let updated = repo
            .update(
                article.id,
                &ArticleUpdateDBRequest {
                    title: Some("New Title".to_string()),
                    summary: Some("Short".to_string()),
                    category_ids: Some(vec![news]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.slug, "launch-day");
        assert_eq!(updated.summary.as_deref(), Some("Short"));
        assert_eq!(updated.categories.iter().map(|c| c.id).collect::<Vec<_>>(), vec![news]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_rename_recomputes_derived_slug(pool: PgPool) {
        let author_id = author(&pool, "Rina").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Articles::new(&mut conn);

        let article = repo.create(&create_request(author_id, "Cloud ERP")).await.unwrap();
        let published = chrono::Utc::now();
        let updated = repo
            .update(
                article.id,
                &ArticleUpdateDBRequest {
                    title: Some("Cloud HR".to_string()),
                    published_at: Some(Some(published)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.slug, "cloud-hr");
        assert!(updated.published_at.is_some());

        let unpublished = repo
            .update(
                article.id,
                &ArticleUpdateDBRequest {
                    published_at: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(unpublished.published_at.is_none());
        assert_eq!(unpublished.slug, "cloud-hr");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_by_slug(pool: PgPool) {
        let author_id = author(&pool, "Rina").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Articles::new(&mut conn);
        let article = repo.create(&create_request(author_id, "Hello World")).await.unwrap();

        let found = repo.get_by_slug("hello-world").await.unwrap().unwrap();
        assert_eq!(found.id, article.id);
        assert!(repo.get_by_slug("missing").await.unwrap().is_none());
    }
}
