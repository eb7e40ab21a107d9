use crate::{
    AppState,
    api::{
        extract::AppJson,
        handlers::{not_found, require_text},
        models::{
            pagination::{ListQuery, PaginatedResponse},
            promos::{PromoCreate, PromoResponse, PromoUpdate},
        },
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        errors::DbError,
        handlers::{Promos, Repository, promos::PromoFilter},
    },
    errors::{Error, Result},
    types::PromoId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/promos",
    tag = "promos",
    summary = "List promos",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated list of promos", body = PaginatedResponse<PromoResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_promos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _: RequiresPermission<resource::Promos, operation::ReadAll>,
) -> Result<Json<PaginatedResponse<PromoResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = PromoFilter::new(skip, limit);
    if let Some(search) = query.search() {
        filter = filter.with_search(search);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Promos::new(&mut conn);
    let promos = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        promos.into_iter().map(PromoResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    post,
    path = "/promos",
    tag = "promos",
    summary = "Create promo",
    description = "Several promos may be active; the public banner shows the most recently updated one.",
    request_body = PromoCreate,
    responses(
        (status = 201, description = "Promo created", body = PromoResponse),
        (status = 403, description = "Admin only"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_promo(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Promos, operation::CreateAll>,
    AppJson(request): AppJson<PromoCreate>,
) -> Result<(StatusCode, Json<PromoResponse>)> {
    require_text("title", Some(&request.title))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let promo = Promos::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(PromoResponse::from(promo))))
}

#[utoipa::path(
    get,
    path = "/promos/{id}",
    tag = "promos",
    summary = "Get promo",
    params(("id" = uuid::Uuid, Path, description = "Promo ID")),
    responses(
        (status = 200, description = "Promo", body = PromoResponse),
        (status = 404, description = "Promo not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(promo_id = %id))]
pub async fn get_promo(
    State(state): State<AppState>,
    Path(id): Path<PromoId>,
    _: RequiresPermission<resource::Promos, operation::ReadAll>,
) -> Result<Json<PromoResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let promo = Promos::new(&mut conn).get_by_id(id).await?.ok_or_else(|| not_found("Promo", id))?;

    Ok(Json(PromoResponse::from(promo)))
}

#[utoipa::path(
    patch,
    path = "/promos/{id}",
    tag = "promos",
    summary = "Update promo",
    request_body = PromoUpdate,
    params(("id" = uuid::Uuid, Path, description = "Promo ID")),
    responses(
        (status = 200, description = "Promo updated", body = PromoResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Promo not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(promo_id = %id))]
pub async fn update_promo(
    State(state): State<AppState>,
    Path(id): Path<PromoId>,
    _: RequiresPermission<resource::Promos, operation::UpdateAll>,
    AppJson(request): AppJson<PromoUpdate>,
) -> Result<Json<PromoResponse>> {
    require_text("title", request.title.as_deref())?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let promo = Promos::new(&mut conn).update(id, &request).await.map_err(|e| match e {
        DbError::NotFound => not_found("Promo", id),
        e => e.into(),
    })?;

    Ok(Json(PromoResponse::from(promo)))
}

#[utoipa::path(
    delete,
    path = "/promos/{id}",
    tag = "promos",
    summary = "Delete promo",
    params(("id" = uuid::Uuid, Path, description = "Promo ID")),
    responses(
        (status = 204, description = "Promo deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Promo not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(promo_id = %id))]
pub async fn delete_promo(
    State(state): State<AppState>,
    Path(id): Path<PromoId>,
    _: RequiresPermission<resource::Promos, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Promos::new(&mut conn).delete(id).await? {
        return Err(not_found("Promo", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_editor, create_test_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_promo_crud(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&admin);

        let response = app
            .post("/admin/api/v1/promos")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "title": "Year-end sale",
                "cta_label": "Book a demo",
                "features": "Free onboarding\nSix months support",
                "idle_bg_color": "#0F172A"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let promo: PromoResponse = response.json();
        assert!(!promo.is_active);
        assert_eq!(promo.features, vec!["Free onboarding", "Six months support"]);

        let response = app
            .patch(&format!("/admin/api/v1/promos/{}", promo.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({"is_active": true, "cta_label": ""}))
            .await;
        response.assert_status_ok();
        let updated: PromoResponse = response.json();
        assert!(updated.is_active);
        assert_eq!(updated.cta_label, None);
        assert_eq!(updated.features.len(), 2);

        app.delete(&format!("/admin/api/v1/promos/{}", promo.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.get(&format!("/admin/api/v1/promos/{}", promo.id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_editor_cannot_write(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let (editor, _) = create_test_editor(&pool).await;
        let (name, value) = add_auth_headers(&editor);

        app.get("/admin/api/v1/promos").add_header(name.clone(), value.clone()).await.assert_status_ok();
        app.post("/admin/api/v1/promos")
            .add_header(name, value)
            .json(&json!({"title": "Flash sale"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
