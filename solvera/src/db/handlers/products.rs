//! Database repository for product pages and their child collections.

use crate::api::models::products::{ProductCreate, ProductFeatureInput, ProductUpdate, ProductWhyUsInput};
use crate::db::{
    errors::{DbError, Result},
    handlers::{
        faqs::{self, FaqOwner},
        repository::Repository,
        slugs::{SlugTable, Slugs},
        utils::{group_by_parent, position_order, push_search},
    },
    models::products::{ProductDBResponse, ProductFeature, ProductWhyUs},
};
use crate::slugs;
use crate::types::{ProductId, abbrev_uuid};
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing products
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            search: None,
            category: None,
        }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_category(mut self, category: String) -> Self {
        self.category = Some(category);
        self
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(ref category) = self.category {
            query.push(" AND LOWER(category) = LOWER(");
            query.push_bind(category.trim().to_string());
            query.push(")");
        }
        if let Some(ref search) = self.search {
            push_search(query, &["name", "slug", "hero_title"], search);
        }
    }
}

pub struct Products<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Products<'c> {
    type CreateRequest = ProductCreate;
    type UpdateRequest = ProductUpdate;
    type Response = ProductDBResponse;
    type Id = ProductId;
    type Filter = ProductFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();
        {
            let mut tx = self.db.begin().await?;

            let base = slugs::requested_base(request.slug.as_deref(), &request.name);
            let slug = Slugs::new(&mut tx).allocate(&base, None).await?;

            sqlx::query(
                r#"
                INSERT INTO products (
                    id, slug, name, category, hero_title, hero_subtitle, hero_image,
                    cta_primary_text, cta_secondary_text, cta_image, slug_is_custom
                )
                VALUES ($1, $2, $3, NULLIF($4, ''), $5, NULLIF($6, ''), NULLIF($7, ''), NULLIF($8, ''), NULLIF($9, ''), NULLIF($10, ''), $11)
                "#,
            )
            .bind(id)
            .bind(&slug)
            .bind(request.name.trim())
            .bind(request.category.as_deref().map(str::trim))
            .bind(&request.hero_title)
            .bind(&request.hero_subtitle)
            .bind(&request.hero_image)
            .bind(&request.cta_primary_text)
            .bind(&request.cta_secondary_text)
            .bind(&request.cta_image)
            .bind(slugs::is_explicit(request.slug.as_deref()))
            .execute(&mut *tx)
            .await?;

            replace_features(&mut tx, id, &request.features).await?;
            replace_why_us(&mut tx, id, &request.why_us).await?;
            faqs::replace(&mut tx, FaqOwner::Product, id, &request.faqs).await?;

            tx.commit().await?;
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), fields(product_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let product = sqlx::query_as::<_, ProductDBResponse>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        match product {
            Some(product) => Ok(self.with_children(vec![product]).await?.pop()),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let products = sqlx::query_as::<_, ProductDBResponse>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        let products = self.with_children(products).await?;
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM products WHERE 1=1");
        filter.push_conditions(&mut query);

        query.push(" ORDER BY created_at DESC, id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let products = query.build_query_as::<ProductDBResponse>().fetch_all(&mut *self.db).await?;
        self.with_children(products).await
    }

    #[instrument(skip(self), fields(product_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(product_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        {
            let mut tx = self.db.begin().await?;

            let (old_name, slug_is_custom): (String, bool) = sqlx::query_as("SELECT name, slug_is_custom FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(DbError::NotFound)?;

            let new_name = request.name.as_deref().map(str::trim);
            let slug = if slugs::needs_recompute(request.slug.as_deref(), &old_name, new_name, slug_is_custom) {
                let base = slugs::requested_base(request.slug.as_deref(), new_name.unwrap_or(&old_name));
                Some(Slugs::new(&mut tx).allocate(&base, Some((SlugTable::Products, id))).await?)
            } else {
                None
            };

            sqlx::query(
                r#"
                UPDATE products SET
                    slug = COALESCE($2, slug),
                    name = COALESCE($3, name),
                    category = CASE WHEN $4::text IS NULL THEN category ELSE NULLIF($4, '') END,
                    hero_title = COALESCE($5, hero_title),
                    hero_subtitle = CASE WHEN $6::text IS NULL THEN hero_subtitle ELSE NULLIF($6, '') END,
                    hero_image = CASE WHEN $7::text IS NULL THEN hero_image ELSE NULLIF($7, '') END,
                    cta_primary_text = CASE WHEN $8::text IS NULL THEN cta_primary_text ELSE NULLIF($8, '') END,
                    cta_secondary_text = CASE WHEN $9::text IS NULL THEN cta_secondary_text ELSE NULLIF($9, '') END,
                    cta_image = CASE WHEN $10::text IS NULL THEN cta_image ELSE NULLIF($10, '') END,
                    slug_is_custom = slug_is_custom OR $11,
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(&slug)
            .bind(new_name)
            .bind(request.category.as_deref().map(str::trim))
            .bind(&request.hero_title)
            .bind(&request.hero_subtitle)
            .bind(&request.hero_image)
            .bind(&request.cta_primary_text)
            .bind(&request.cta_secondary_text)
            .bind(&request.cta_image)
            .bind(slugs::is_explicit(request.slug.as_deref()))
            .execute(&mut *tx)
            .await?;

            if let Some(ref features) = request.features {
                replace_features(&mut tx, id, features).await?;
            }
            if let Some(ref why_us) = request.why_us {
                replace_why_us(&mut tx, id, why_us).await?;
            }
            if let Some(ref faq_inputs) = request.faqs {
                faqs::replace(&mut tx, FaqOwner::Product, id, faq_inputs).await?;
            }

            tx.commit().await?;
        }

        self.get_by_id(id).await?.ok_or(DbError::NotFound)
    }
}

async fn replace_features(conn: &mut PgConnection, product_id: ProductId, features: &[ProductFeatureInput]) -> Result<()> {
    sqlx::query("DELETE FROM product_features WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    for (index, feature) in features.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO product_features (
                id, product_id, section_title, section_subtitle, tab_label, content_title,
                content_description, image_url, benefits, sequence
            )
            VALUES ($1, $2, NULLIF($3, ''), NULLIF($4, ''), $5, $6, NULLIF($7, ''), NULLIF($8, ''), $9, $10)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(&feature.section_title)
        .bind(&feature.section_subtitle)
        .bind(&feature.tab_label)
        .bind(&feature.content_title)
        .bind(&feature.content_description)
        .bind(&feature.image_url)
        .bind(&feature.benefits)
        .bind(position_order(feature.sequence, index))
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn replace_why_us(conn: &mut PgConnection, product_id: ProductId, items: &[ProductWhyUsInput]) -> Result<()> {
    sqlx::query("DELETE FROM product_why_us WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    for (index, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO product_why_us (id, product_id, section_title, section_subtitle, card_label, icon, sequence)
            VALUES ($1, $2, NULLIF($3, ''), NULLIF($4, ''), NULLIF($5, ''), NULLIF($6, ''), $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(&item.section_title)
        .bind(&item.section_subtitle)
        .bind(&item.card_label)
        .bind(&item.icon)
        .bind(position_order(item.sequence, index))
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

impl<'c> Products<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &ProductFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM products WHERE 1=1");
        filter.push_conditions(&mut query);

        let count: (i64,) = query.build_query_as().fetch_one(&mut *self.db).await?;
        Ok(count.0)
    }

    /// Every product, oldest first, optionally narrowed to one category.
    #[instrument(skip(self), err)]
    pub async fn list_all(&mut self, category: Option<&str>) -> Result<Vec<ProductDBResponse>> {
        let mut query = QueryBuilder::new("SELECT * FROM products WHERE 1=1");
        if let Some(category) = category {
            query.push(" AND LOWER(category) = LOWER(");
            query.push_bind(category.trim().to_string());
            query.push(")");
        }
        query.push(" ORDER BY created_at, id");

        let products = query.build_query_as::<ProductDBResponse>().fetch_all(&mut *self.db).await?;
        self.with_children(products).await
    }

    #[instrument(skip(self), fields(slug = %slug), err)]
    pub async fn get_by_slug(&mut self, slug: &str) -> Result<Option<ProductDBResponse>> {
        let product = sqlx::query_as::<_, ProductDBResponse>("SELECT * FROM products WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&mut *self.db)
            .await?;

        match product {
            Some(product) => Ok(self.with_children(vec![product]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn with_children(&mut self, mut products: Vec<ProductDBResponse>) -> Result<Vec<ProductDBResponse>> {
        if products.is_empty() {
            return Ok(products);
        }
        let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();

        let features = sqlx::query_as::<_, ProductFeature>(
            "SELECT * FROM product_features WHERE product_id = ANY($1) ORDER BY sequence, created_at, id",
        )
        .bind(&ids)
        .fetch_all(&mut *self.db)
        .await?;
        let why_us = sqlx::query_as::<_, ProductWhyUs>(
            "SELECT * FROM product_why_us WHERE product_id = ANY($1) ORDER BY sequence, created_at, id",
        )
        .bind(&ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut features = group_by_parent(features, |f| f.product_id);
        let mut why_us = group_by_parent(why_us, |w| w.product_id);
        let mut faqs = faqs::load(&mut *self.db, FaqOwner::Product, &ids).await?;

        for product in &mut products {
            product.features = features.remove(&product.id).unwrap_or_default();
            product.why_us = why_us.remove(&product.id).unwrap_or_default();
            product.faqs = faqs.remove(&product.id).unwrap_or_default();
        }
        Ok(products)
    }
}
