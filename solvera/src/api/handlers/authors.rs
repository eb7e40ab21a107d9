use crate::{
    AppState,
    api::{
        extract::AppJson,
        handlers::not_found,
        models::{
            authors::{AuthorCreate, AuthorResponse, AuthorUpdate},
            pagination::{ListQuery, PaginatedResponse},
        },
    },
    auth::permissions::{RequiresPermission, has_permission, operation, resource},
    db::{
        errors::DbError,
        handlers::{Authors, Repository, authors::AuthorFilter},
    },
    errors::{Error, Result},
    types::{AuthorId, Operation, Resource},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    summary = "List authors",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated list of authors", body = PaginatedResponse<AuthorResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_authors(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _: RequiresPermission<resource::Authors, operation::ReadAll>,
) -> Result<Json<PaginatedResponse<AuthorResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = AuthorFilter::new(skip, limit);
    if let Some(search) = query.search() {
        filter = filter.with_search(search);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Authors::new(&mut conn);
    let authors = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        authors.into_iter().map(AuthorResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    summary = "Create author",
    request_body = AuthorCreate,
    responses(
        (status = 201, description = "Author created", body = AuthorResponse),
        (status = 403, description = "Admin only"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_author(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Authors, operation::CreateAll>,
    AppJson(request): AppJson<AuthorCreate>,
) -> Result<(StatusCode, Json<AuthorResponse>)> {
    if request.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Author name must not be empty".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let author = Authors::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(AuthorResponse::from(author))))
}

#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    summary = "Get author",
    params(("id" = uuid::Uuid, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author", body = AuthorResponse),
        (status = 404, description = "Author not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(author_id = %id))]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<AuthorId>,
    _: RequiresPermission<resource::Authors, operation::ReadAll>,
) -> Result<Json<AuthorResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let author = Authors::new(&mut conn).get_by_id(id).await?.ok_or_else(|| not_found("Author", id))?;

    Ok(Json(AuthorResponse::from(author)))
}

#[utoipa::path(
    patch,
    path = "/authors/{id}",
    tag = "authors",
    summary = "Update author",
    description = "Editors may only update the author profile linked to their account.",
    request_body = AuthorUpdate,
    params(("id" = uuid::Uuid, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author updated", body = AuthorResponse),
        (status = 403, description = "Not your author profile"),
        (status = 404, description = "Author not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(author_id = %id))]
pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<AuthorId>,
    current_user: RequiresPermission<resource::Authors, operation::UpdateOwn>,
    AppJson(request): AppJson<AuthorUpdate>,
) -> Result<Json<AuthorResponse>> {
    if !has_permission(&current_user, Resource::Authors, Operation::UpdateAll) && current_user.author_id != Some(id) {
        return Err(Error::InsufficientPermissions {
            resource: Resource::Authors,
            action: Operation::UpdateAll,
        });
    }
    if request.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(Error::BadRequest {
            message: "Author name must not be empty".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let author = Authors::new(&mut conn).update(id, &request).await.map_err(|e| match e {
        DbError::NotFound => not_found("Author", id),
        e => e.into(),
    })?;

    Ok(Json(AuthorResponse::from(author)))
}

#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    summary = "Delete author",
    description = "Fails with 409 while articles still reference the author. Linked user accounts are unlinked.",
    params(("id" = uuid::Uuid, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still has articles"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(author_id = %id))]
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<AuthorId>,
    _: RequiresPermission<resource::Authors, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let deleted = Authors::new(&mut conn).delete(id).await.map_err(|e| match e {
        DbError::ForeignKeyViolation { .. } => Error::Conflict {
            message: "Author still has articles; reassign or delete them first".to_string(),
        },
        e => e.into(),
    })?;

    if !deleted {
        return Err(not_found("Author", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
