//! Database repository for blog categories.

use crate::api::models::categories::{CategoryCreate, CategoryUpdate};
use crate::db::{
    errors::{DbError, Result},
    handlers::{repository::Repository, utils::push_search},
    models::categories::CategoryDBResponse,
};
use crate::types::{CategoryId, abbrev_uuid};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CategoryFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
}

impl CategoryFilter {
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

pub struct Categories<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Categories<'c> {
    type CreateRequest = CategoryCreate;
    type UpdateRequest = CategoryUpdate;
    type Response = CategoryDBResponse;
    type Id = CategoryId;
    type Filter = CategoryFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let category = sqlx::query_as::<_, CategoryDBResponse>("INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING *")
            .bind(Uuid::new_v4())
            .bind(request.name.trim())
            .fetch_one(&mut *self.db)
            .await?;

        Ok(category)
    }

    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let category = sqlx::query_as::<_, CategoryDBResponse>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(category)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let categories = sqlx::query_as::<_, CategoryDBResponse>("SELECT * FROM categories WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(categories.into_iter().map(|c| (c.id, c)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM categories WHERE 1=1");
        filter.push_conditions(&mut query);

        query.push(" ORDER BY name, id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        Ok(query.build_query_as::<CategoryDBResponse>().fetch_all(&mut *self.db).await?)
    }

    #[instrument(skip(self), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(category_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let category = sqlx::query_as::<_, CategoryDBResponse>(
            "UPDATE categories SET name = COALESCE($2, name), updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(request.name.as_deref().map(str::trim))
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(category)
    }
}

impl<'c> Categories<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &CategoryFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM categories WHERE 1=1");
        filter.push_conditions(&mut query);

        let count: (i64,) = query.build_query_as().fetch_one(&mut *self.db).await?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_category_names_are_unique(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        repo.create(&CategoryCreate { name: "Tips".to_string() }).await.unwrap();
        let err = repo.create(&CategoryCreate { name: " Tips ".to_string() }).await.unwrap_err();

        match err {
            DbError::UniqueViolation { table, constraint, .. } => {
                assert_eq!(table.as_deref(), Some("categories"));
                assert_eq!(constraint.as_deref(), Some("categories_name_key"));
            }
            other => panic!("expected unique violation, got {other:?}"),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_rename_and_delete(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Categories::new(&mut conn);

        let category = repo.create(&CategoryCreate { name: "News".to_string() }).await.unwrap();
        let renamed = repo
            .update(
                category.id,
                &CategoryUpdate {
                    name: Some("Company News".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Company News");

        assert!(repo.delete(category.id).await.unwrap());
        assert!(repo.get_by_id(category.id).await.unwrap().is_none());
    }
}
