use crate::{
    AppState,
    api::{
        extract::AppJson,
        handlers::{not_found, require_text},
        models::{
            pagination::{ListQuery, PaginatedResponse},
            social_trust::{SocialTrustCreate, SocialTrustResponse, SocialTrustUpdate},
        },
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        errors::DbError,
        handlers::{Repository, SocialTrusts, social_trust::SocialTrustFilter},
    },
    errors::{Error, Result},
    types::SocialTrustId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/social-trusts",
    tag = "social_trust",
    summary = "List partner logos",
    params(ListQuery),
    responses(
        (status = 200, description = "Partner logos in display order", body = PaginatedResponse<SocialTrustResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_social_trusts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _: RequiresPermission<resource::SocialTrust, operation::ReadAll>,
) -> Result<Json<PaginatedResponse<SocialTrustResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = SocialTrustFilter::new(skip, limit);
    if let Some(search) = query.search() {
        filter = filter.with_search(search);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = SocialTrusts::new(&mut conn);
    let logos = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        logos.into_iter().map(SocialTrustResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    post,
    path = "/social-trusts",
    tag = "social_trust",
    summary = "Create partner logo",
    request_body = SocialTrustCreate,
    responses(
        (status = 201, description = "Partner logo created", body = SocialTrustResponse),
        (status = 403, description = "Admin only"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_social_trust(
    State(state): State<AppState>,
    _: RequiresPermission<resource::SocialTrust, operation::CreateAll>,
    AppJson(request): AppJson<SocialTrustCreate>,
) -> Result<(StatusCode, Json<SocialTrustResponse>)> {
    require_text("name", Some(&request.name))?;
    require_text("logo_url", Some(&request.logo_url))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let logo = SocialTrusts::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(SocialTrustResponse::from(logo))))
}

#[utoipa::path(
    get,
    path = "/social-trusts/{id}",
    tag = "social_trust",
    summary = "Get partner logo",
    params(("id" = uuid::Uuid, Path, description = "Partner logo ID")),
    responses(
        (status = 200, description = "Partner logo", body = SocialTrustResponse),
        (status = 404, description = "Partner logo not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(social_trust_id = %id))]
pub async fn get_social_trust(
    State(state): State<AppState>,
    Path(id): Path<SocialTrustId>,
    _: RequiresPermission<resource::SocialTrust, operation::ReadAll>,
) -> Result<Json<SocialTrustResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let logo = SocialTrusts::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Partner logo", id))?;

    Ok(Json(SocialTrustResponse::from(logo)))
}

#[utoipa::path(
    patch,
    path = "/social-trusts/{id}",
    tag = "social_trust",
    summary = "Update partner logo",
    request_body = SocialTrustUpdate,
    params(("id" = uuid::Uuid, Path, description = "Partner logo ID")),
    responses(
        (status = 200, description = "Partner logo updated", body = SocialTrustResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Partner logo not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(social_trust_id = %id))]
pub async fn update_social_trust(
    State(state): State<AppState>,
    Path(id): Path<SocialTrustId>,
    _: RequiresPermission<resource::SocialTrust, operation::UpdateAll>,
    AppJson(request): AppJson<SocialTrustUpdate>,
) -> Result<Json<SocialTrustResponse>> {
    require_text("name", request.name.as_deref())?;
    require_text("logo_url", request.logo_url.as_deref())?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let logo = SocialTrusts::new(&mut conn).update(id, &request).await.map_err(|e| match e {
        DbError::NotFound => not_found("Partner logo", id),
        e => e.into(),
    })?;

    Ok(Json(SocialTrustResponse::from(logo)))
}

#[utoipa::path(
    delete,
    path = "/social-trusts/{id}",
    tag = "social_trust",
    summary = "Delete partner logo",
    params(("id" = uuid::Uuid, Path, description = "Partner logo ID")),
    responses(
        (status = 204, description = "Partner logo deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Partner logo not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(social_trust_id = %id))]
pub async fn delete_social_trust(
    State(state): State<AppState>,
    Path(id): Path<SocialTrustId>,
    _: RequiresPermission<resource::SocialTrust, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !SocialTrusts::new(&mut conn).delete(id).await? {
        return Err(not_found("Partner logo", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
