use crate::{
    AppState,
    api::{
        extract::AppJson,
        handlers::{not_found, require_text},
        models::{
            pagination::{PaginatedResponse, normalize_search},
            solutions::{ListSolutionsQuery, SolutionCreate, SolutionResponse, SolutionUpdate},
        },
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        errors::DbError,
        handlers::{Repository, Solutions, solutions::SolutionFilter},
    },
    errors::{Error, Result},
    types::SolutionId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

fn unknown_product() -> Error {
    Error::BadRequest {
        message: "Related product does not exist".to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/solutions",
    tag = "solutions",
    summary = "List solutions",
    params(ListSolutionsQuery),
    responses(
        (status = 200, description = "Paginated list of solutions", body = PaginatedResponse<SolutionResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_solutions(
    State(state): State<AppState>,
    Query(query): Query<ListSolutionsQuery>,
    _: RequiresPermission<resource::Solutions, operation::ReadAll>,
) -> Result<Json<PaginatedResponse<SolutionResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = SolutionFilter::new(skip, limit);
    if let Some(search) = normalize_search(query.search.as_deref()) {
        filter = filter.with_search(search);
    }
    if let Some(category) = normalize_search(query.category.as_deref()) {
        filter = filter.with_category(category);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Solutions::new(&mut conn);
    let solutions = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        solutions.into_iter().map(SolutionResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    post,
    path = "/solutions",
    tag = "solutions",
    summary = "Create solution",
    request_body = SolutionCreate,
    responses(
        (status = 201, description = "Solution created", body = SolutionResponse),
        (status = 400, description = "Missing required text or unknown related product"),
        (status = 403, description = "Admin only"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_solution(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Solutions, operation::CreateAll>,
    AppJson(request): AppJson<SolutionCreate>,
) -> Result<(StatusCode, Json<SolutionResponse>)> {
    require_text("name", Some(&request.name))?;
    require_text("hero_title", Some(&request.hero_title))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let solution = Solutions::new(&mut conn).create(&request).await.map_err(|e| match e {
        DbError::ForeignKeyViolation { .. } => unknown_product(),
        e => e.into(),
    })?;

    Ok((StatusCode::CREATED, Json(SolutionResponse::from(solution))))
}

#[utoipa::path(
    get,
    path = "/solutions/{id}",
    tag = "solutions",
    summary = "Get solution",
    params(("id" = uuid::Uuid, Path, description = "Solution ID")),
    responses(
        (status = 200, description = "Solution", body = SolutionResponse),
        (status = 404, description = "Solution not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(solution_id = %id))]
pub async fn get_solution(
    State(state): State<AppState>,
    Path(id): Path<SolutionId>,
    _: RequiresPermission<resource::Solutions, operation::ReadAll>,
) -> Result<Json<SolutionResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let solution = Solutions::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| not_found("Solution", id))?;

    Ok(Json(SolutionResponse::from(solution)))
}

#[utoipa::path(
    patch,
    path = "/solutions/{id}",
    tag = "solutions",
    summary = "Update solution",
    description = "Child collections that are present in the body replace the stored ones.",
    request_body = SolutionUpdate,
    params(("id" = uuid::Uuid, Path, description = "Solution ID")),
    responses(
        (status = 200, description = "Solution updated", body = SolutionResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Solution not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(solution_id = %id))]
pub async fn update_solution(
    State(state): State<AppState>,
    Path(id): Path<SolutionId>,
    _: RequiresPermission<resource::Solutions, operation::UpdateAll>,
    AppJson(request): AppJson<SolutionUpdate>,
) -> Result<Json<SolutionResponse>> {
    require_text("name", request.name.as_deref())?;
    require_text("hero_title", request.hero_title.as_deref())?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let solution = Solutions::new(&mut conn).update(id, &request).await.map_err(|e| match e {
        DbError::NotFound => not_found("Solution", id),
        DbError::ForeignKeyViolation { .. } => unknown_product(),
        e => e.into(),
    })?;

    Ok(Json(SolutionResponse::from(solution)))
}

#[utoipa::path(
    delete,
    path = "/solutions/{id}",
    tag = "solutions",
    summary = "Delete solution",
    params(("id" = uuid::Uuid, Path, description = "Solution ID")),
    responses(
        (status = 204, description = "Solution deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Solution not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(solution_id = %id))]
pub async fn delete_solution(
    State(state): State<AppState>,
    Path(id): Path<SolutionId>,
    _: RequiresPermission<resource::Solutions, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Solutions::new(&mut conn).delete(id).await? {
        return Err(not_found("Solution", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{products::ProductResponse, solutions::SectionType, users::Role};
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_editor, create_test_user};
    use serde_json::{Value, json};
    use sqlx::PgPool;
    use uuid::Uuid;

    #[sqlx::test]
    #[test_log::test]
    async fn test_solution_lifecycle_with_related_products(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&admin);

        let product: ProductResponse = app
            .post("/admin/api/v1/products")
            .add_header(name.clone(), value.clone())
            .json(&json!({"name": "Sales CRM", "hero_title": "Close more deals"}))
            .await
            .json();

        let response = app
            .post("/admin/api/v1/solutions")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "name": "Sales Automation",
                "hero_title": "Automate your pipeline",
                "why_us": [
                    {"section_type": "CORE_SOLUTION", "title": "Lead scoring"},
                    {"title": "Trusted partner"}
                ],
                "related_products": [{"product_id": product.id, "icon_url": "https://cdn.example.com/crm.svg"}]
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let solution: SolutionResponse = response.json();
        assert_eq!(solution.slug, "sales-automation");
        assert_eq!(solution.why_us.len(), 2);
        assert_eq!(solution.why_us[0].section_type, SectionType::CoreSolution);
        assert_eq!(solution.why_us[1].section_type, SectionType::Value);
        assert_eq!(solution.related_products.len(), 1);

        let response = app
            .patch(&format!("/admin/api/v1/solutions/{}", solution.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({"name": "Sales Suite", "related_products": []}))
            .await;
        response.assert_status_ok();
        let updated: SolutionResponse = response.json();
        assert_eq!(updated.slug, "sales-suite");
        assert!(updated.related_products.is_empty());
        assert_eq!(updated.why_us.len(), 2);

        app.delete(&format!("/admin/api/v1/solutions/{}", solution.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.delete(&format!("/admin/api/v1/solutions/{}", solution.id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_related_product_rejected(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&admin);

        let response = app
            .post("/admin/api/v1/solutions")
            .add_header(name, value)
            .json(&json!({
                "name": "Orphan",
                "hero_title": "Nothing to link",
                "related_products": [{"product_id": Uuid::new_v4()}]
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"]["message"], "Related product does not exist");

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM solutions").fetch_one(&pool).await.unwrap();
        assert_eq!(count, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_slug_shared_with_products(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&admin);

        app.post("/admin/api/v1/products")
            .add_header(name.clone(), value.clone())
            .json(&json!({"name": "Field Service", "hero_title": "Product"}))
            .await
            .assert_status(StatusCode::CREATED);

        let solution: SolutionResponse = app
            .post("/admin/api/v1/solutions")
            .add_header(name, value)
            .json(&json!({"name": "Field Service", "hero_title": "Solution"}))
            .await
            .json();
        assert_eq!(solution.slug, "field-service-1");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_editor_cannot_write(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let (editor, _) = create_test_editor(&pool).await;
        let (name, value) = add_auth_headers(&editor);

        app.get("/admin/api/v1/solutions").add_header(name.clone(), value.clone()).await.assert_status_ok();
        app.post("/admin/api/v1/solutions")
            .add_header(name, value)
            .json(&json!({"name": "X", "hero_title": "Y"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
