//! Database repository for partner logos.

use crate::api::models::social_trust::{SocialTrustCreate, SocialTrustUpdate};
use crate::db::{
    errors::{DbError, Result},
    handlers::{repository::Repository, utils::push_search},
    models::social_trust::SocialTrustDBResponse,
};
use crate::types::{SocialTrustId, abbrev_uuid};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SocialTrustFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl SocialTrustFilter {
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

pub struct SocialTrusts<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for SocialTrusts<'c> {
    type CreateRequest = SocialTrustCreate;
    type UpdateRequest = SocialTrustUpdate;
    type Response = SocialTrustDBResponse;
    type Id = SocialTrustId;
    type Filter = SocialTrustFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let logo = sqlx::query_as::<_, SocialTrustDBResponse>(
            r#"
            INSERT INTO social_trusts (id, name, logo_url, sequence)
            VALUES ($1, $2, $3, COALESCE($4, (SELECT COALESCE(MAX(sequence), 0) + 1 FROM social_trusts)))
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.name.trim())
        .bind(&request.logo_url)
        .bind(request.sequence)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(logo)
    }

    #[instrument(skip(self), fields(social_trust_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let logo = sqlx::query_as::<_, SocialTrustDBResponse>("SELECT * FROM social_trusts WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(logo)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let logos = sqlx::query_as::<_, SocialTrustDBResponse>("SELECT * FROM social_trusts WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(logos.into_iter().map(|l| (l.id, l)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM social_trusts WHERE 1=1");
        filter.push_conditions(&mut query);

        query.push(" ORDER BY sequence, created_at, id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        Ok(query.build_query_as::<SocialTrustDBResponse>().fetch_all(&mut *self.db).await?)
    }

    #[instrument(skip(self), fields(social_trust_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM social_trusts WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(social_trust_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let logo = sqlx::query_as::<_, SocialTrustDBResponse>(
            r#"
            UPDATE social_trusts SET
                name = COALESCE($2, name),
                logo_url = COALESCE($3, logo_url),
                sequence = COALESCE($4, sequence),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.name.as_deref().map(str::trim))
        .bind(&request.logo_url)
        .bind(request.sequence)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(logo)
    }
}

impl<'c> SocialTrusts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &SocialTrustFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM social_trusts WHERE 1=1");
        filter.push_conditions(&mut query);

        let count: (i64,) = query.build_query_as().fetch_one(&mut *self.db).await?;
        Ok(count.0)
    }

    /// Every partner logo in display order.
    #[instrument(skip(self), err)]
    pub async fn list_all(&mut self) -> Result<Vec<SocialTrustDBResponse>> {
        let logos = sqlx::query_as::<_, SocialTrustDBResponse>("SELECT * FROM social_trusts ORDER BY sequence, created_at, id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(logos)
    }
}
