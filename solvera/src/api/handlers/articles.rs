use crate::{
    AppState,
    api::{
        extract::AppJson,
        handlers::not_found,
        models::{
            articles::{ArticleCreate, ArticleResponse, ArticleUpdate, ListArticlesQuery},
            pagination::{PaginatedResponse, normalize_search},
            users::CurrentUser,
        },
    },
    auth::permissions::{RequiresPermission, can_read_all_resources, operation, resource},
    db::{
        handlers::{Articles, Repository, articles::ArticleFilter},
        models::articles::{ArticleCreateDBRequest, ArticleDBResponse, ArticleUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{ArticleId, AuthorId, Operation, Resource},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

/// Which articles the caller may see and touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    All,
    Author(AuthorId),
    /// Editor without an author profile
    Nothing,
}

fn author_scope(user: &CurrentUser) -> Scope {
    if can_read_all_resources(user, Resource::Articles) {
        Scope::All
    } else {
        user.author_id.map_or(Scope::Nothing, Scope::Author)
    }
}

/// Fetch an article the caller may act on. Rows outside the caller's scope are reported as
/// missing.
async fn load_in_scope(repo: &mut Articles<'_>, id: ArticleId, user: &CurrentUser) -> Result<ArticleDBResponse> {
    let article = repo.get_by_id(id).await?.ok_or_else(|| not_found("Article", id))?;
    match author_scope(user) {
        Scope::All => Ok(article),
        Scope::Author(author_id) if article.author_id == author_id => Ok(article),
        _ => Err(not_found("Article", id)),
    }
}

fn validate_text(field: &str, value: Option<&str>) -> Result<()> {
    if value.is_some_and(|v| v.trim().is_empty()) {
        return Err(Error::BadRequest {
            message: format!("Article {field} must not be empty"),
        });
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/articles",
    tag = "articles",
    summary = "List articles",
    description = "Editors only see articles written under their own author profile.",
    params(ListArticlesQuery),
    responses(
        (status = 200, description = "Paginated list of articles", body = PaginatedResponse<ArticleResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListArticlesQuery>,
    current_user: RequiresPermission<resource::Articles, operation::ReadOwn>,
) -> Result<Json<PaginatedResponse<ArticleResponse>>> {
    let (skip, limit) = query.pagination.params();

    let mut filter = ArticleFilter::new(skip, limit);
    match author_scope(&current_user) {
        Scope::All => {}
        Scope::Author(author_id) => filter = filter.with_author(author_id),
        Scope::Nothing => return Ok(Json(PaginatedResponse::new(vec![], 0, skip, limit))),
    }
    if let Some(search) = normalize_search(query.search.as_deref()) {
        filter = filter.with_search(search);
    }
    if let Some(category_id) = query.category_id {
        filter = filter.with_category(category_id);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Articles::new(&mut conn);
    let articles = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        articles.into_iter().map(ArticleResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    post,
    path = "/articles",
    tag = "articles",
    summary = "Create article",
    description = "The slug is derived from the title unless given, and suffixed (`-1`, `-2`, ...) \
                   until it is unique. Editors always write under their own author profile.",
    request_body = ArticleCreate,
    responses(
        (status = 201, description = "Article created", body = ArticleResponse),
        (status = 400, description = "Missing author or unknown category"),
        (status = 403, description = "Editor has no author profile"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_article(
    State(state): State<AppState>,
    current_user: RequiresPermission<resource::Articles, operation::CreateOwn>,
    AppJson(request): AppJson<ArticleCreate>,
) -> Result<(StatusCode, Json<ArticleResponse>)> {
    validate_text("title", Some(&request.title))?;

    let author_id = match author_scope(&current_user) {
        Scope::All => request.author_id.ok_or_else(|| Error::BadRequest {
            message: "author_id is required".to_string(),
        })?,
        Scope::Author(own) => own,
        Scope::Nothing => {
            return Err(Error::InsufficientPermissions {
                resource: Resource::Articles,
                action: Operation::CreateOwn,
            });
        }
    };

    let db_request = ArticleCreateDBRequest {
        author_id,
        title: request.title,
        slug: request.slug,
        summary: request.summary,
        content: request.content,
        image_url: request.image_url,
        published_at: request.published_at,
        category_ids: request.category_ids,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let article = Articles::new(&mut conn).create(&db_request).await?;

    Ok((StatusCode::CREATED, Json(ArticleResponse::from(article))))
}

#[utoipa::path(
    get,
    path = "/articles/{id}",
    tag = "articles",
    summary = "Get article",
    params(("id" = uuid::Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article", body = ArticleResponse),
        (status = 404, description = "Article not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(article_id = %id))]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<ArticleId>,
    current_user: RequiresPermission<resource::Articles, operation::ReadOwn>,
) -> Result<Json<ArticleResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let article = load_in_scope(&mut Articles::new(&mut conn), id, &current_user).await?;

    Ok(Json(ArticleResponse::from(article)))
}

#[utoipa::path(
    patch,
    path = "/articles/{id}",
    tag = "articles",
    summary = "Update article",
    description = "Changing the title recomputes an auto-generated slug. `category_ids` replaces the \
                   category set. Editors may not move an article to another author.",
    request_body = ArticleUpdate,
    params(("id" = uuid::Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Article updated", body = ArticleResponse),
        (status = 403, description = "Editors may not reassign articles"),
        (status = 404, description = "Article not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(article_id = %id))]
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<ArticleId>,
    current_user: RequiresPermission<resource::Articles, operation::UpdateOwn>,
    AppJson(request): AppJson<ArticleUpdate>,
) -> Result<Json<ArticleResponse>> {
    validate_text("title", request.title.as_deref())?;
    validate_text("content", request.content.as_deref())?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Articles::new(&mut conn);
    let existing = load_in_scope(&mut repo, id, &current_user).await?;

    if let (Scope::Author(_), Some(new_author)) = (author_scope(&current_user), request.author_id)
        && new_author != existing.author_id
    {
        return Err(Error::InsufficientPermissions {
            resource: Resource::Articles,
            action: Operation::UpdateAll,
        });
    }

    let db_request = ArticleUpdateDBRequest {
        author_id: request.author_id,
        title: request.title,
        slug: request.slug,
        summary: request.summary,
        content: request.content,
        image_url: request.image_url,
        published_at: request.published_at,
        category_ids: request.category_ids,
    };
    let article = repo.update(id, &db_request).await?;

    Ok(Json(ArticleResponse::from(article)))
}

#[utoipa::path(
    delete,
    path = "/articles/{id}",
    tag = "articles",
    summary = "Delete article",
    params(("id" = uuid::Uuid, Path, description = "Article ID")),
    responses(
        (status = 204, description = "Article deleted"),
        (status = 404, description = "Article not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(article_id = %id))]
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<ArticleId>,
    current_user: RequiresPermission<resource::Articles, operation::DeleteOwn>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Articles::new(&mut conn);
    load_in_scope(&mut repo, id, &current_user).await?;

    if !repo.delete(id).await? {
        return Err(not_found("Article", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_author, create_test_editor, create_test_user};
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_article_lifecycle(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let author = create_test_author(&pool, "Rina").await;
        let (name, value) = add_auth_headers(&admin);

        let response = app
            .post("/admin/api/v1/categories")
            .add_header(name.clone(), value.clone())
            .json(&json!({"name": "Tips"}))
            .await;
        let category_id = response.json::<Value>()["id"].as_str().unwrap().to_string();

        let response = app
            .post("/admin/api/v1/articles")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "title": "Cara Memilih ERP",
                "content": "<p>Isi</p>",
                "author_id": author.id,
                "category_ids": [category_id],
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let article: ArticleResponse = response.json();
        assert_eq!(article.slug, "cara-memilih-erp");
        assert_eq!(article.author_name, "Rina");
        assert_eq!(article.categories.len(), 1);

        // same title gets a suffixed slug
        let response = app
            .post("/admin/api/v1/articles")
            .add_header(name.clone(), value.clone())
            .json(&json!({"title": "Cara Memilih ERP", "content": "x", "author_id": author.id}))
            .await;
        assert_eq!(response.json::<ArticleResponse>().slug, "cara-memilih-erp-1");

        let response = app
            .patch(&format!("/admin/api/v1/articles/{}", article.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({"summary": "Ringkas", "category_ids": []}))
            .await;
        response.assert_status_ok();
        let updated: ArticleResponse = response.json();
        assert_eq!(updated.summary.as_deref(), Some("Ringkas"));
        assert!(updated.categories.is_empty());
        assert_eq!(updated.slug, "cara-memilih-erp");

        let response = app
            .get(&format!("/admin/api/v1/articles?category_id={category_id}"))
            .add_header(name.clone(), value.clone())
            .await;
        assert_eq!(response.json::<PaginatedResponse<ArticleResponse>>().total_count, 0);

        app.delete(&format!("/admin/api/v1/articles/{}", article.id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_must_name_author(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&admin);

        app.post("/admin/api/v1/articles")
            .add_header(name, value)
            .json(&json!({"title": "Orphan", "content": "x"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_editor_scoped_to_own_articles(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (editor, own_author) = create_test_editor(&pool).await;
        let other_author = create_test_author(&pool, "Other").await;

        // admin writes one article for someone else
        let (admin_name, admin_value) = add_auth_headers(&admin);
        let foreign: ArticleResponse = app
            .post("/admin/api/v1/articles")
            .add_header(admin_name, admin_value)
            .json(&json!({"title": "Not Yours", "content": "x", "author_id": other_author.id}))
            .await
            .json();

        // editor's author_id is forced to their own profile
        let (name, value) = add_auth_headers(&editor);
        let response = app
            .post("/admin/api/v1/articles")
            .add_header(name.clone(), value.clone())
            .json(&json!({"title": "Mine", "content": "x", "author_id": other_author.id}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let mine: ArticleResponse = response.json();
        assert_eq!(mine.author_id, own_author.id);

        let page: PaginatedResponse<ArticleResponse> =
            app.get("/admin/api/v1/articles").add_header(name.clone(), value.clone()).await.json();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].id, mine.id);

        let path = format!("/admin/api/v1/articles/{}", foreign.id);
        app.get(&path).add_header(name.clone(), value.clone()).await.assert_status(StatusCode::NOT_FOUND);
        app.patch(&path)
            .add_header(name.clone(), value.clone())
            .json(&json!({"title": "Taken over"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.delete(&path).add_header(name.clone(), value.clone()).await.assert_status(StatusCode::NOT_FOUND);

        // no moving articles to another author
        app.patch(&format!("/admin/api/v1/articles/{}", mine.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({"author_id": other_author.id}))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        app.patch(&format!("/admin/api/v1/articles/{}", mine.id))
            .add_header(name, value)
            .json(&json!({"title": "Mine, revised"}))
            .await
            .assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_editor_without_author_profile(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let editor = create_test_user(&pool, Role::Editor).await;
        let (name, value) = add_auth_headers(&editor);

        let page: PaginatedResponse<ArticleResponse> =
            app.get("/admin/api/v1/articles").add_header(name.clone(), value.clone()).await.json();
        assert_eq!(page.total_count, 0);

        app.post("/admin/api/v1/articles")
            .add_header(name, value)
            .json(&json!({"title": "Nope", "content": "x"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_category_is_bad_request(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let (editor, _) = create_test_editor(&pool).await;
        let (name, value) = add_auth_headers(&editor);

        app.post("/admin/api/v1/articles")
            .add_header(name, value)
            .json(&json!({"title": "Tagged", "content": "x", "category_ids": [uuid::Uuid::new_v4()]}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_editor_access_follows_account_changes(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (editor, old_author) = create_test_editor(&pool).await;
        let new_author = create_test_author(&pool, "Rina").await;
        let (admin_name, admin_value) = add_auth_headers(&admin);
        let (name, value) = add_auth_headers(&editor);

        let article: ArticleResponse = app
            .post("/admin/api/v1/articles")
            .add_header(name.clone(), value.clone())
            .json(&json!({"title": "Before Relink", "content": "x"}))
            .await
            .json();
        assert_eq!(article.author_id, old_author.id);

        app.patch(&format!("/admin/api/v1/users/{}", editor.id))
            .add_header(admin_name.clone(), admin_value.clone())
            .json(&json!({"author_id": new_author.id}))
            .await
            .assert_status_ok();

        // the session issued before the relink no longer reaches the old author's rows
        app.patch(&format!("/admin/api/v1/articles/{}", article.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({"title": "Still mine?"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        let created: ArticleResponse = app
            .post("/admin/api/v1/articles")
            .add_header(name.clone(), value.clone())
            .json(&json!({"title": "After Relink", "content": "x"}))
            .await
            .json();
        assert_eq!(created.author_id, new_author.id);

        app.delete(&format!("/admin/api/v1/users/{}", editor.id))
            .add_header(admin_name, admin_value)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        app.post("/admin/api/v1/articles")
            .add_header(name, value)
            .json(&json!({"title": "After Delete", "content": "x"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
