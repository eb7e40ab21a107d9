//! Database repository for promotional banners.

use crate::api::models::promos::{PromoCreate, PromoUpdate};
use crate::db::{
    errors::{DbError, Result},
    handlers::{repository::Repository, utils::push_search},
    models::promos::PromoDBResponse,
};
use crate::types::{PromoId, abbrev_uuid};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PromoFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl PromoFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit, search: None }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(ref search) = self.search {
            push_search(query, &["title"], search);
        }
    }
}

pub struct Promos<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Promos<'c> {
    type CreateRequest = PromoCreate;
    type UpdateRequest = PromoUpdate;
    type Response = PromoDBResponse;
    type Id = PromoId;
    type Filter = PromoFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let promo = sqlx::query_as::<_, PromoDBResponse>(
            r#"
            INSERT INTO promos (
                id, is_active, title, subtitle, cta_label, cta_link,
                promo_badge_line1, promo_badge_line2, promo_badge_label, features,
                idle_bg_color, scroll_bg_color, illustration_url, image_url
            )
            VALUES (
                $1, $2, $3, NULLIF($4, ''), NULLIF($5, ''), NULLIF($6, ''),
                NULLIF($7, ''), NULLIF($8, ''), NULLIF($9, ''), $10,
                NULLIF($11, ''), NULLIF($12, ''), NULLIF($13, ''), NULLIF($14, '')
            )
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.is_active)
        .bind(&request.title)
        .bind(&request.subtitle)
        .bind(&request.cta_label)
        .bind(&request.cta_link)
        .bind(&request.promo_badge_line1)
        .bind(&request.promo_badge_line2)
        .bind(&request.promo_badge_label)
        .bind(&request.features)
        .bind(&request.idle_bg_color)
        .bind(&request.scroll_bg_color)
        .bind(&request.illustration_url)
        .bind(&request.image_url)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(promo)
    }

    #[instrument(skip(self), fields(promo_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let promo = sqlx::query_as::<_, PromoDBResponse>("SELECT * FROM promos WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(promo)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let promos = sqlx::query_as::<_, PromoDBResponse>("SELECT * FROM promos WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(promos.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM promos WHERE 1=1");
        filter.push_conditions(&mut query);

        query.push(" ORDER BY created_at DESC, id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        Ok(query.build_query_as::<PromoDBResponse>().fetch_all(&mut *self.db).await?)
    }

    #[instrument(skip(self), fields(promo_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM promos WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(promo_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let promo = sqlx::query_as::<_, PromoDBResponse>(
            r#"
            UPDATE promos SET
                is_active = COALESCE($2, is_active),
                title = COALESCE($3, title),
                subtitle = CASE WHEN $4::text IS NULL THEN subtitle ELSE NULLIF($4, '') END,
                cta_label = CASE WHEN $5::text IS NULL THEN cta_label ELSE NULLIF($5, '') END,
                cta_link = CASE WHEN $6::text IS NULL THEN cta_link ELSE NULLIF($6, '') END,
                promo_badge_line1 = CASE WHEN $7::text IS NULL THEN promo_badge_line1 ELSE NULLIF($7, '') END,
                promo_badge_line2 = CASE WHEN $8::text IS NULL THEN promo_badge_line2 ELSE NULLIF($8, '') END,
                promo_badge_label = CASE WHEN $9::text IS NULL THEN promo_badge_label ELSE NULLIF($9, '') END,
                features = COALESCE($10, features),
                idle_bg_color = CASE WHEN $11::text IS NULL THEN idle_bg_color ELSE NULLIF($11, '') END,
                scroll_bg_color = CASE WHEN $12::text IS NULL THEN scroll_bg_color ELSE NULLIF($12, '') END,
                illustration_url = CASE WHEN $13::text IS NULL THEN illustration_url ELSE NULLIF($13, '') END,
                image_url = CASE WHEN $14::text IS NULL THEN image_url ELSE NULLIF($14, '') END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.is_active)
        .bind(&request.title)
        .bind(&request.subtitle)
        .bind(&request.cta_label)
        .bind(&request.cta_link)
        .bind(&request.promo_badge_line1)
        .bind(&request.promo_badge_line2)
        .bind(&request.promo_badge_label)
        .bind(&request.features)
        .bind(&request.idle_bg_color)
        .bind(&request.scroll_bg_color)
        .bind(&request.illustration_url)
        .bind(&request.image_url)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(promo)
    }
}

impl<'c> Promos<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &PromoFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM promos WHERE 1=1");
        filter.push_conditions(&mut query);

        let count: (i64,) = query.build_query_as().fetch_one(&mut *self.db).await?;
        Ok(count.0)
    }

    /// The banner to show: the most recently updated active promo.
    #[instrument(skip(self), err)]
    pub async fn get_active(&mut self) -> Result<Option<PromoDBResponse>> {
        let promo = sqlx::query_as::<_, PromoDBResponse>(
            "SELECT * FROM promos WHERE is_active ORDER BY updated_at DESC, created_at DESC, id LIMIT 1",
        )
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(promo)
    }
}
