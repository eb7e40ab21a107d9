use crate::{
    AppState,
    api::{
        extract::AppJson,
        handlers::{not_found, require_text},
        models::{
            pagination::{ListQuery, PaginatedResponse},
            services::{ServicePageCreate, ServicePageResponse, ServicePageUpdate, validate_competencies},
        },
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        errors::DbError,
        handlers::{Repository, ServicePages, services::ServicePageFilter},
    },
    errors::{Error, Result},
    types::ServicePageId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/services",
    tag = "services",
    summary = "List service pages",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated list of service pages", body = PaginatedResponse<ServicePageResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_service_pages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _: RequiresPermission<resource::Services, operation::ReadAll>,
) -> Result<Json<PaginatedResponse<ServicePageResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = ServicePageFilter::new(skip, limit);
    if let Some(search) = query.search() {
        filter = filter.with_search(search);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = ServicePages::new(&mut conn);
    let pages = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        pages.into_iter().map(ServicePageResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    post,
    path = "/services",
    tag = "services",
    summary = "Create service page",
    request_body = ServicePageCreate,
    responses(
        (status = 201, description = "Service page created", body = ServicePageResponse),
        (status = 400, description = "Missing required text or competency out of range"),
        (status = 403, description = "Admin only"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_service_page(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Services, operation::CreateAll>,
    AppJson(request): AppJson<ServicePageCreate>,
) -> Result<(StatusCode, Json<ServicePageResponse>)> {
    require_text("page_name", Some(&request.page_name))?;
    require_text("hero_heading", Some(&request.hero_heading))?;
    validate_competencies(&request.competencies).map_err(|message| Error::BadRequest { message })?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let page = ServicePages::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(ServicePageResponse::from(page))))
}

#[utoipa::path(
    get,
    path = "/services/{id}",
    tag = "services",
    summary = "Get service page",
    params(("id" = uuid::Uuid, Path, description = "Service page ID")),
    responses(
        (status = 200, description = "Service page", body = ServicePageResponse),
        (status = 404, description = "Service page not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(service_page_id = %id))]
pub async fn get_service_page(
    State(state): State<AppState>,
    Path(id): Path<ServicePageId>,
    _: RequiresPermission<resource::Services, operation::ReadAll>,
) -> Result<Json<ServicePageResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let page = ServicePages::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Service page", id))?;

    Ok(Json(ServicePageResponse::from(page)))
}

#[utoipa::path(
    patch,
    path = "/services/{id}",
    tag = "services",
    summary = "Update service page",
    description = "Child collections that are present in the body replace the stored ones.",
    request_body = ServicePageUpdate,
    params(("id" = uuid::Uuid, Path, description = "Service page ID")),
    responses(
        (status = 200, description = "Service page updated", body = ServicePageResponse),
        (status = 400, description = "Competency out of range"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Service page not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(service_page_id = %id))]
pub async fn update_service_page(
    State(state): State<AppState>,
    Path(id): Path<ServicePageId>,
    _: RequiresPermission<resource::Services, operation::UpdateAll>,
    AppJson(request): AppJson<ServicePageUpdate>,
) -> Result<Json<ServicePageResponse>> {
    require_text("page_name", request.page_name.as_deref())?;
    require_text("hero_heading", request.hero_heading.as_deref())?;
    if let Some(ref competencies) = request.competencies {
        validate_competencies(competencies).map_err(|message| Error::BadRequest { message })?;
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let page = ServicePages::new(&mut conn).update(id, &request).await.map_err(|e| match e {
        DbError::NotFound => not_found("Service page", id),
        e => e.into(),
    })?;

    Ok(Json(ServicePageResponse::from(page)))
}

#[utoipa::path(
    delete,
    path = "/services/{id}",
    tag = "services",
    summary = "Delete service page",
    params(("id" = uuid::Uuid, Path, description = "Service page ID")),
    responses(
        (status = 204, description = "Service page deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Service page not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(service_page_id = %id))]
pub async fn delete_service_page(
    State(state): State<AppState>,
    Path(id): Path<ServicePageId>,
    _: RequiresPermission<resource::Services, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !ServicePages::new(&mut conn).delete(id).await? {
        return Err(not_found("Service page", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
