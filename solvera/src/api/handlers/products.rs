use crate::{
    AppState,
    api::{
        extract::AppJson,
        handlers::{not_found, require_text},
        models::{
            pagination::{PaginatedResponse, normalize_search},
            products::{ListProductsQuery, ProductCreate, ProductResponse, ProductUpdate},
        },
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        errors::DbError,
        handlers::{Products, Repository, products::ProductFilter},
    },
    errors::{Error, Result},
    types::ProductId,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    summary = "List products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Paginated list of products", body = PaginatedResponse<ProductResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
    _: RequiresPermission<resource::Products, operation::ReadAll>,
) -> Result<Json<PaginatedResponse<ProductResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut filter = ProductFilter::new(skip, limit);
    if let Some(search) = normalize_search(query.search.as_deref()) {
        filter = filter.with_search(search);
    }
    if let Some(category) = normalize_search(query.category.as_deref()) {
        filter = filter.with_category(category);
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Products::new(&mut conn);
    let products = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        products.into_iter().map(ProductResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    summary = "Create product",
    description = "The slug is derived from the name when omitted and suffixed until unique across all pages.",
    request_body = ProductCreate,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing name or hero title"),
        (status = 403, description = "Admin only"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Products, operation::CreateAll>,
    AppJson(request): AppJson<ProductCreate>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    require_text("name", Some(&request.name))?;
    require_text("hero_title", Some(&request.hero_title))?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let product = Products::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    summary = "Get product",
    params(("id" = uuid::Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(product_id = %id))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    _: RequiresPermission<resource::Products, operation::ReadAll>,
) -> Result<Json<ProductResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let product = Products::new(&mut conn).get_by_id(id).await?.ok_or_else(|| not_found("Product", id))?;

    Ok(Json(ProductResponse::from(product)))
}

#[utoipa::path(
    patch,
    path = "/products/{id}",
    tag = "products",
    summary = "Update product",
    description = "Child collections that are present in the body replace the stored ones.",
    request_body = ProductUpdate,
    params(("id" = uuid::Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(product_id = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    _: RequiresPermission<resource::Products, operation::UpdateAll>,
    AppJson(request): AppJson<ProductUpdate>,
) -> Result<Json<ProductResponse>> {
    require_text("name", request.name.as_deref())?;
    require_text("hero_title", request.hero_title.as_deref())?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let product = Products::new(&mut conn).update(id, &request).await.map_err(|e| match e {
        DbError::NotFound => not_found("Product", id),
        e => e.into(),
    })?;

    Ok(Json(ProductResponse::from(product)))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    summary = "Delete product",
    description = "Features, why-us rows, FAQs and solution links of the product are removed with it.",
    params(("id" = uuid::Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Product not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(product_id = %id))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    _: RequiresPermission<resource::Products, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Products::new(&mut conn).delete(id).await? {
        return Err(not_found("Product", id));
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

    fn erp_product() -> serde_json::Value {
        json!({
            "name": "Cloud ERP",
            "category": "ERP",
            "hero_title": "Run your whole business",
            "features": [
                {"tab_label": "Inventory", "content_title": "Stock in real time", "benefits": "Multi warehouse\nBatch tracking", "sequence": 2},
                {"tab_label": "Finance", "content_title": "Close books faster", "benefits": ["Auto journals"], "sequence": 1}
            ],
            "why_us": [{"card_label": "Local support", "icon": "headset"}],
            "faqs": [{"question": "Is there a trial?", "answer": "Yes, 14 days."}]
        })
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_product_lifecycle(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&admin);

        let response = app
            .post("/admin/api/v1/products")
            .add_header(name.clone(), value.clone())
            .json(&erp_product())
            .await;
        response.assert_status(StatusCode::CREATED);
        let product: ProductResponse = response.json();
        assert_eq!(product.slug, "cloud-erp");
        assert_eq!(product.features.len(), 2);
        assert_eq!(product.features[0].tab_label, "Finance");
        assert_eq!(product.features[1].benefits, vec!["Multi warehouse", "Batch tracking"]);
        assert_eq!(product.faqs.len(), 1);

        let response = app
            .post("/admin/api/v1/products")
            .add_header(name.clone(), value.clone())
            .json(&erp_product())
            .await;
        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<ProductResponse>().slug, "cloud-erp-1");

        let response = app
            .patch(&format!("/admin/api/v1/products/{}", product.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({"hero_subtitle": "For growing teams", "faqs": []}))
            .await;
        response.assert_status_ok();
        let updated: ProductResponse = response.json();
        assert_eq!(updated.slug, "cloud-erp");
        assert_eq!(updated.hero_subtitle.as_deref(), Some("For growing teams"));
        assert_eq!(updated.features.len(), 2);
        assert!(updated.faqs.is_empty());

        let response = app
            .get("/admin/api/v1/products?category=erp&search=cloud")
            .add_header(name.clone(), value.clone())
            .await;
        assert_eq!(response.json::<PaginatedResponse<ProductResponse>>().total_count, 2);

        app.delete(&format!("/admin/api/v1/products/{}", product.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.get(&format!("/admin/api/v1/products/{}", product.id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_product_requires_name_and_hero_title(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&admin);

        app.post("/admin/api/v1/products")
            .add_header(name.clone(), value.clone())
            .json(&json!({"name": " ", "hero_title": "Title"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        app.post("/admin/api/v1/products")
            .add_header(name, value)
            .json(&json!({"name": "Name"}))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_editor_is_read_only(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let (editor, _) = create_test_editor(&pool).await;
        let (name, value) = add_auth_headers(&editor);

        app.get("/admin/api/v1/products").add_header(name.clone(), value.clone()).await.assert_status_ok();
        app.post("/admin/api/v1/products")
            .add_header(name, value)
            .json(&erp_product())
            .await
            .assert_status(StatusCode::FORBIDDEN);
        app.get("/admin/api/v1/products").await.assert_status(StatusCode::UNAUTHORIZED);
    }
}
