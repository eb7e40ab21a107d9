//! Database repository for blog authors.

use crate::api::models::authors::{AuthorCreate, AuthorUpdate};
use crate::db::{
    errors::{DbError, Result},
    handlers::{repository::Repository, utils::push_search},
    models::authors::AuthorDBResponse,
};
use crate::types::{AuthorId, abbrev_uuid};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AuthorFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl AuthorFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(ref search) = self.search {
            push_search(query, &["name"], search);
        }
    }
}

pub struct Authors<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Authors<'c> {
    type CreateRequest = AuthorCreate;
    type UpdateRequest = AuthorUpdate;
    type Response = AuthorDBResponse;
    type Id = AuthorId;
    type Filter = AuthorFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let author = sqlx::query_as::<_, AuthorDBResponse>(
            "INSERT INTO authors (id, name, photo_url) VALUES ($1, $2, NULLIF($3, '')) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(request.name.trim())
        .bind(&request.photo_url)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(author)
    }

    #[instrument(skip(self), fields(author_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let author = sqlx::query_as::<_, AuthorDBResponse>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(author)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let authors = sqlx::query_as::<_, AuthorDBResponse>("SELECT * FROM authors WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(authors.into_iter().map(|a| (a.id, a)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM authors WHERE 1=1");
        filter.push_conditions(&mut query);

        query.push(" ORDER BY name, id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        Ok(query.build_query_as::<AuthorDBResponse>().fetch_all(&mut *self.db).await?)
    }

    #[instrument(skip(self), fields(author_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(author_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let author = sqlx::query_as::<_, AuthorDBResponse>(
            r#"
            UPDATE authors SET
                name = COALESCE($2, name),
                photo_url = CASE WHEN $3::text IS NULL THEN photo_url ELSE NULLIF($3, '') END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(&request.photo_url)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(author)
    }
}

impl<'c> Authors<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &AuthorFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM authors WHERE 1=1");
        filter.push_conditions(&mut query);

        let count: (i64,) = query.build_query_as().fetch_one(&mut *self.db).await?;
        Ok(count.0)
    }
}
