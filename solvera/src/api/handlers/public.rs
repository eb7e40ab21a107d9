//! Read-only endpoints consumed by the marketing site.
//!
//! Everything here is unauthenticated and wrapped in [`ApiResponse`].

use crate::{
    AppState,
    api::models::{
        articles::{PublicArticle, PublicArticlesQuery},
        envelope::ApiResponse,
        pagination::normalize_search,
        products::{ProductResponse, PublicProductsQuery},
        promos::PublicPromo,
        services::{PublicServicePage, ServicePageList},
        social_trust::{SocialTrustItem, SocialTrustSection},
        solutions::PublicSolution,
    },
    db::handlers::{Articles, Products, Promos, Repository, ServicePages, SocialTrusts, Solutions, articles::ArticleFilter},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::{Value, json};
use sqlx::PgConnection;

async fn trusted_by(conn: &mut PgConnection) -> Result<Vec<SocialTrustItem>> {
    let logos = SocialTrusts::new(conn).list_all().await?;
    Ok(logos.into_iter().map(SocialTrustItem::from).collect())
}

/// Liveness banner
#[utoipa::path(get, path = "/", tag = "public", responses((status = 200, description = "Service is running")))]
pub async fn root() -> Json<Value> {
    Json(json!({"status": "ok", "message": "Solvera Backend is running"}))
}

#[utoipa::path(get, path = "/healthz", tag = "public", responses((status = 200, description = "Healthy", body = String)))]
pub async fn healthz() -> &'static str {
    "OK"
}

#[utoipa::path(
    get,
    path = "/products",
    tag = "public",
    summary = "List products",
    params(PublicProductsQuery),
    responses((status = 200, description = "All products, oldest first", body = ApiResponse<Vec<ProductResponse>>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<PublicProductsQuery>,
) -> Result<Json<ApiResponse<Vec<ProductResponse>>>> {
    let category = normalize_search(query.category.as_deref());

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let products = Products::new(&mut conn).list_all(category.as_deref()).await?;

    Ok(Json(ApiResponse::ok(products.into_iter().map(ProductResponse::from).collect())))
}

#[utoipa::path(
    get,
    path = "/products/{slug}",
    tag = "public",
    summary = "Get product by slug",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Product Not Found"),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn get_product(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<ApiResponse<ProductResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let product = Products::new(&mut conn)
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| Error::not_found_with_message("Product", &slug, "Product Not Found"))?;

    Ok(Json(ApiResponse::ok(ProductResponse::from(product))))
}

#[utoipa::path(
    get,
    path = "/solutions",
    tag = "public",
    summary = "List solutions",
    responses((status = 200, description = "All solutions in page shape, oldest first", body = ApiResponse<Vec<PublicSolution>>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_solutions(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<PublicSolution>>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let solutions = Solutions::new(&mut conn).list_all().await?;
    let trusted_by = trusted_by(&mut conn).await?;

    let shaped = solutions
        .into_iter()
        .map(|solution| PublicSolution::shape(solution, trusted_by.clone()))
        .collect();

    Ok(Json(ApiResponse::ok(shaped)))
}

#[utoipa::path(
    get,
    path = "/solutions/{slug}",
    tag = "public",
    summary = "Get solution by slug",
    params(("slug" = String, Path, description = "Solution slug")),
    responses(
        (status = 200, description = "Solution in page shape", body = ApiResponse<PublicSolution>),
        (status = 404, description = "Solution Not Found"),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn get_solution(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<ApiResponse<PublicSolution>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let solution = Solutions::new(&mut conn)
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| Error::not_found_with_message("Solution", &slug, "Solution Not Found"))?;
    let trusted_by = trusted_by(&mut conn).await?;

    Ok(Json(ApiResponse::ok(PublicSolution::shape(solution, trusted_by))))
}

#[utoipa::path(
    get,
    path = "/services",
    tag = "public",
    summary = "List service pages",
    responses((status = 200, description = "Service pages, most recently updated first", body = ApiResponse<ServicePageList>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_service_pages(State(state): State<AppState>) -> Result<Json<ApiResponse<ServicePageList>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let pages = ServicePages::new(&mut conn).list_all().await?;

    let items: Vec<PublicServicePage> = pages.into_iter().map(PublicServicePage::from).collect();
    let count = items.len();

    Ok(Json(ApiResponse::ok(ServicePageList { items, count })))
}

#[utoipa::path(
    get,
    path = "/services/{slug}",
    tag = "public",
    summary = "Get service page by slug",
    params(("slug" = String, Path, description = "Service page slug")),
    responses(
        (status = 200, description = "Service page", body = ApiResponse<PublicServicePage>),
        (status = 404, description = "Service Page Not Found"),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn get_service_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<PublicServicePage>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let page = ServicePages::new(&mut conn)
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| Error::not_found_with_message("Service page", &slug, "Service Page Not Found"))?;

    Ok(Json(ApiResponse::ok(PublicServicePage::from(page))))
}

#[utoipa::path(
    get,
    path = "/articles",
    tag = "public",
    summary = "Latest articles",
    params(PublicArticlesQuery),
    responses((status = 200, description = "Newest first by publish date", body = ApiResponse<Vec<PublicArticle>>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<PublicArticlesQuery>,
) -> Result<Json<ApiResponse<Vec<PublicArticle>>>> {
    let filter = ArticleFilter::new(0, query.limit());

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let articles = Articles::new(&mut conn).list(&filter).await?;

    Ok(Json(ApiResponse::ok(articles.into_iter().map(PublicArticle::from).collect())))
}

#[utoipa::path(
    get,
    path = "/articles/{slug}",
    tag = "public",
    summary = "Get article by slug",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Article with publisher and categories", body = ApiResponse<PublicArticle>),
        (status = 404, description = "Article not found"),
    )
)]
#[tracing::instrument(skip_all, fields(slug = %slug))]
pub async fn get_article(State(state): State<AppState>, Path(slug): Path<String>) -> Result<Json<ApiResponse<PublicArticle>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let article = Articles::new(&mut conn)
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| Error::not_found_with_message("Article", &slug, "Article not found"))?;

    Ok(Json(ApiResponse::ok(PublicArticle::from(article))))
}

#[utoipa::path(
    get,
    path = "/promo",
    tag = "public",
    summary = "Active promo banner",
    responses(
        (status = 200, description = "The most recently updated active promo", body = ApiResponse<PublicPromo>),
        (status = 404, description = "No active promo found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_active_promo(State(state): State<AppState>) -> Result<Json<ApiResponse<PublicPromo>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let promo = Promos::new(&mut conn)
        .get_active()
        .await?
        .ok_or_else(|| Error::not_found_with_message("Promo", "active", "No active promo found"))?;

    Ok(Json(ApiResponse::ok(PublicPromo::from(promo))))
}

#[utoipa::path(
    get,
    path = "/social-trust",
    tag = "public",
    summary = "Partner logo strip",
    responses((status = 200, description = "Partner logos in display order", body = ApiResponse<SocialTrustSection>))
)]
#[tracing::instrument(skip_all)]
pub async fn get_social_trust(State(state): State<AppState>) -> Result<Json<ApiResponse<SocialTrustSection>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let items = trusted_by(&mut conn).await?;

    Ok(Json(ApiResponse::ok(SocialTrustSection::new(items))))
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::Role;
    use crate::test_utils::{add_auth_headers, create_test_app, create_test_author, create_test_user};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_root_and_healthz(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app.get("/").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), json!({"status": "ok", "message": "Solvera Backend is running"}));

        let response = app.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_public_products(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&admin);

        for (product, category) in [("Cloud ERP", "ERP"), ("Sales CRM", "CRM")] {
            app.post("/admin/api/v1/products")
                .add_header(name.clone(), value.clone())
                .json(&json!({"name": product, "category": category, "hero_title": product}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let body: Value = app.get("/api/v1/products").await.json();
        assert_eq!(body["success"], true);
        assert!(body["error"].is_null());
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["data"][0]["slug"], "cloud-erp");

        let body: Value = app.get("/api/v1/products?category=crm").await.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["name"], "Sales CRM");

        let body: Value = app.get("/api/v1/products/sales-crm").await.json();
        assert_eq!(body["data"]["hero_title"], "Sales CRM");

        let response = app.get("/api/v1/products/missing").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());
        assert_eq!(body["error"]["message"], "Product Not Found");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_public_solution_shape(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&admin);

        let product: Value = app
            .post("/admin/api/v1/products")
            .add_header(name.clone(), value.clone())
            .json(&json!({"name": "Retail POS", "hero_title": "Sell anywhere", "hero_subtitle": "For shops"}))
            .await
            .json();
        app.post("/admin/api/v1/social-trusts")
            .add_header(name.clone(), value.clone())
            .json(&json!({"name": "Astra", "logo_url": "https://cdn.example.com/astra.png"}))
            .await
            .assert_status(StatusCode::CREATED);
        app.post("/admin/api/v1/solutions")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "name": "Retail",
                "hero_title": "Retail made simple",
                "features": [{"tab_label": "Stores", "benefits": "Omnichannel\nLoyalty"}],
                "why_us": [
                    {"section_type": "VALUE", "title": "Fast", "description": "Live in weeks"},
                    {"section_type": "CORE_SOLUTION", "title": "Unified stock"}
                ],
                "related_products": [{"product_id": product["id"], "sequence": 3}]
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let body: Value = app.get("/api/v1/solutions/retail").await.json();
        let data = &body["data"];
        assert_eq!(data["core_benefits"][0]["values"], json!(["Omnichannel", "Loyalty"]));
        assert_eq!(data["core_values"][0]["icon_title"], "Fast");
        assert_eq!(data["core_values"][0]["icon_description"], "Live in weeks");
        assert_eq!(data["core_solution"]["section_title"], "Keunggulan Solusi Kami");
        assert_eq!(data["core_solution"]["items"][0]["title"], "Unified stock");
        assert_eq!(data["industry_section"]["section_title"], "Industri Terkait");
        assert_eq!(data["industry_section"]["industries"][0]["name"], "Retail POS");
        assert_eq!(data["industry_section"]["industries"][0]["description"], "For shops");
        assert_eq!(data["industry_section"]["industries"][0]["sequence"], 3);
        assert_eq!(data["trusted_by"][0]["name"], "Astra");

        let body: Value = app.get("/api/v1/solutions").await.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let response = app.get("/api/v1/solutions/nope").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"]["message"], "Solution Not Found");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_public_service_page_layouts(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&admin);

        app.post("/admin/api/v1/services")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "page_name": "Managed IT",
                "hero_heading": "We run it for you",
                "quick_step_layout": "standards_grid",
                "quick_steps": [{"step_title": "ISO 27001", "checklist": "Audit\nPolicy"}],
                "methodology_layout": "roles_grid",
                "methodologies": [{"phase_title": "Architect", "icon_image": "https://cdn.example.com/arch.svg"}],
                "offerings": [{"title": "Helpdesk", "button_text": "Contact", "button_url": "/contact"}]
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let body: Value = app.get("/api/v1/services/managed-it").await.json();
        let data = &body["data"];
        assert_eq!(data["hero"]["heading"], "We run it for you");
        assert_eq!(data["quick_steps_section"]["items"][0]["type"], "standard_card");
        assert_eq!(data["quick_steps_section"]["items"][0]["checklist"], json!(["Audit", "Policy"]));
        assert_eq!(data["methodology_section"]["items"][0]["type"], "role_card");
        assert_eq!(data["offerings_section"]["items"][0]["button"], json!({"text": "Contact", "url": "/contact"}));
        assert!(data.get("focus_section").is_none());
        assert!(data.get("competency_section").is_none());

        let body: Value = app.get("/api/v1/services").await.json();
        assert_eq!(body["data"]["count"], 1);

        let response = app.get("/api/v1/services/unknown").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"]["message"], "Service Page Not Found");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_public_articles(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, Role::Admin).await;
        let author = create_test_author(&pool, "Rina").await;
        let (name, value) = add_auth_headers(&admin);

        for (title, published_at) in [
            ("Older", "2024-01-01T00:00:00Z"),
            ("Newer", "2024-06-01T00:00:00Z"),
            ("Middle", "2024-03-01T00:00:00Z"),
        ] {
            app.post("/admin/api/v1/articles")
                .add_header(name.clone(), value.clone())
                .json(&json!({"author_id": author.id, "title": title, "content": "<p>Body</p>", "published_at": published_at}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let body: Value = app.get("/api/v1/articles?limit=2").await.json();
        let titles: Vec<_> = body["data"].as_array().unwrap().iter().map(|a| a["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["Newer", "Middle"]);

        let body: Value = app.get("/api/v1/articles/older").await.json();
        assert_eq!(body["data"]["publisher"]["name"], "Rina");
        assert_eq!(body["data"]["categories"], json!([]));

        let response = app.get("/api/v1/articles/none").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"]["message"], "Article not found");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_public_promo(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app.get("/api/v1/promo").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"]["message"], "No active promo found");

        let admin = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&admin);
        app.post("/admin/api/v1/promos")
            .add_header(name, value)
            .json(&json!({
                "is_active": true,
                "title": "Launch week",
                "promo_badge_line1": "50%",
                "idle_bg_color": "#fff",
                "image_url": "https://cdn.example.com/promo.png"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let body: Value = app.get("/api/v1/promo").await.json();
        let data = &body["data"];
        assert_eq!(data["isActive"], true);
        assert_eq!(data["promoBadge"], json!({"line1": "50%", "line2": "", "label": ""}));
        assert_eq!(data["idleBg"], "#fff");
        assert_eq!(data["image"], "https://cdn.example.com/promo.png");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_public_social_trust(pool: PgPool) {
        let app = create_test_app(pool).await;

        let body: Value = app.get("/api/v1/social-trust").await.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["section_title"], "Dipercaya oleh Perusahaan Terdepan di Indonesia");
        assert_eq!(body["data"]["items"], json!([]));
    }
}
