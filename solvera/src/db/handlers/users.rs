//! Database repository for users.

use crate::types::{UserId, abbrev_uuid};
use crate::{
    api::models::users::Role,
    db::{
        errors::{DbError, Result},
        handlers::{repository::Repository, utils::push_search},
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
    pub search: Option<String>,
    pub role: Option<Role>,
}

impl UserFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self {
            skip,
            limit,
            search: None,
            role: None,
        }
    }

    pub fn with_search(mut self, search: String) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(ref search) = self.search {
            push_search(query, &["username"], search);
        }
        if let Some(role) = self.role {
            query.push(" AND role = ");
            query.push_bind(role);
        }
    }
}

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            INSERT INTO users (id, username, password_hash, role, author_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.username.trim())
        .bind(&request.password_hash)
        .bind(request.role)
        .bind(request.author_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<UserId>) -> Result<HashMap<Self::Id, UserDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = QueryBuilder::new("SELECT * FROM users WHERE 1=1");
        filter.push_conditions(&mut query);

        query.push(" ORDER BY created_at DESC, id LIMIT ");
        query.push_bind(filter.limit);
        query.push(" OFFSET ");
        query.push_bind(filter.skip);

        let users = query.build_query_as::<UserDBResponse>().fetch_all(&mut *self.db).await?;
        Ok(users)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let (set_author, author_id) = match request.author_id {
            Some(author_id) => (true, author_id),
            None => (false, None),
        };

        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                role = COALESCE($4, role),
                author_id = CASE WHEN $5 THEN $6 ELSE author_id END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.username.as_deref().map(str::trim))
        .bind(&request.password_hash)
        .bind(request.role)
        .bind(set_author)
        .bind(author_id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user)
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Count users matching the filter
    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &UserFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE 1=1");
        filter.push_conditions(&mut query);

        let count: (i64,) = query.build_query_as().fetch_one(&mut *self.db).await?;
        Ok(count.0)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_username(&mut self, username: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE username = $1")
            .bind(username.trim())
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Stamp `last_login` and return the updated row.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn record_login(&mut self, id: UserId) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, UserDBResponse>("UPDATE users SET last_login = NOW() WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;
        Ok(user)
    }

    /// Number of admin accounts other than `id`. Used to refuse removing the last admin.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn count_other_admins(&mut self, id: UserId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin' AND id != $1")
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn create_request(username: &str, role: Role) -> UserCreateDBRequest {
        UserCreateDBRequest {
            username: username.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role,
            author_id: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_by_username(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&create_request("dina", Role::Editor)).await.unwrap();
        assert_eq!(created.role, Role::Editor);
        assert!(created.last_login.is_none());

        let found = repo.get_by_username("dina").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_username_is_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&create_request("dina", Role::Editor)).await.unwrap();
        let err = repo.create(&create_request("dina", Role::Admin)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_search_and_count(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&create_request("editor-one", Role::Editor)).await.unwrap();
        repo.create(&create_request("editor-two", Role::Editor)).await.unwrap();
        repo.create(&create_request("boss", Role::Admin)).await.unwrap();

        let filter = UserFilter::new(0, 10).with_search("EDITOR".to_string());
        assert_eq!(repo.list(&filter).await.unwrap().len(), 2);
        assert_eq!(repo.count(&filter).await.unwrap(), 2);

        let filter = UserFilter::new(0, 10).with_role(Role::Admin);
        let admins = repo.list(&filter).await.unwrap();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].username, "boss");

        let page = repo.list(&UserFilter::new(1, 1)).await.unwrap();
        assert_eq!(page.len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_author_link(pool: PgPool) {
        let author_id = Uuid::new_v4();
        sqlx::query("INSERT INTO authors (id, name) VALUES ($1, 'Dina')")
            .bind(author_id)
            .execute(&pool)
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);
        let user = repo.create(&create_request("dina", Role::Editor)).await.unwrap();

        let linked = repo
            .update(
                user.id,
                &UserUpdateDBRequest {
                    author_id: Some(Some(author_id)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(linked.author_id, Some(author_id));

        // leaving author_id out keeps the link
        let renamed = repo
            .update(
                user.id,
                &UserUpdateDBRequest {
                    username: Some("dina.s".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.username, "dina.s");
        assert_eq!(renamed.author_id, Some(author_id));

        let unlinked = repo
            .update(
                user.id,
                &UserUpdateDBRequest {
                    author_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unlinked.author_id, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let err = repo.update(Uuid::new_v4(), &UserUpdateDBRequest::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_record_login_returns_stamped_row(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo.create(&create_request("dina", Role::Editor)).await.unwrap();
        let logged_in = repo.record_login(user.id).await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(logged_in.last_login.is_some());

        assert!(matches!(repo.record_login(Uuid::new_v4()).await.unwrap_err(), DbError::NotFound));
    }
}
