use crate::{
    AppState,
    api::{
        extract::AppJson,
        handlers::not_found,
        models::{
            categories::{CategoryCreate, CategoryResponse, CategoryUpdate},
            pagination::{ListQuery, PaginatedResponse},
        },
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        errors::DbError,
        handlers::{Categories, Repository, categories::CategoryFilter},
    },
    errors::{Error, Result},
    types::CategoryId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

fn empty_name() -> Error {
    Error::BadRequest {
        message: "Category name must not be empty".to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    summary = "List categories",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated list of categories", body = PaginatedResponse<CategoryResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _: RequiresPermission<resource::Categories, operation::ReadAll>,
) -> Result<Json<PaginatedResponse<CategoryResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = CategoryFilter::new(skip, limit);
    if let Some(search) = query.search() {
        filter = filter.with_search(search);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Categories::new(&mut conn);
    let categories = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        categories.into_iter().map(CategoryResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    summary = "Create category",
    request_body = CategoryCreate,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 409, description = "Name already in use"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Categories, operation::CreateAll>,
    AppJson(request): AppJson<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    if request.name.trim().is_empty() {
        return Err(empty_name());
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let category = Categories::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Get category",
    params(("id" = uuid::Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 404, description = "Category not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(category_id = %id))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    _: RequiresPermission<resource::Categories, operation::ReadAll>,
) -> Result<Json<CategoryResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let category = Categories::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Category", id))?;

    Ok(Json(CategoryResponse::from(category)))
}

#[utoipa::path(
    patch,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Update category",
    request_body = CategoryUpdate,
    params(("id" = uuid::Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Category not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(category_id = %id))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    _: RequiresPermission<resource::Categories, operation::UpdateAll>,
    AppJson(request): AppJson<CategoryUpdate>,
) -> Result<Json<CategoryResponse>> {
    if request.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(empty_name());
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let category = Categories::new(&mut conn).update(id, &request).await.map_err(|e| match e {
        DbError::NotFound => not_found("Category", id),
        e => e.into(),
    })?;

    Ok(Json(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    summary = "Delete category",
    description = "Articles tagged with the category lose the tag.",
    params(("id" = uuid::Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Category not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(category_id = %id))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    _: RequiresPermission<resource::Categories, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Categories::new(&mut conn).delete(id).await? {
        return Err(not_found("Category", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
