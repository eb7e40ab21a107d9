//! OpenAPI documentation for the management API (`/admin/api/v1/*`).

use utoipa::OpenApi;

use crate::api::handlers::{articles, authors, categories, products, promos, services, social_trust, solutions, users};

#[derive(OpenApi)]
#[openapi(
    paths(
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        authors::list_authors,
        authors::create_author,
        authors::get_author,
        authors::update_author,
        authors::delete_author,
        categories::list_categories,
        categories::create_category,
        categories::get_category,
        categories::update_category,
        categories::delete_category,
        articles::list_articles,
        articles::create_article,
        articles::get_article,
        articles::update_article,
        articles::delete_article,
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        solutions::list_solutions,
        solutions::create_solution,
        solutions::get_solution,
        solutions::update_solution,
        solutions::delete_solution,
        services::list_service_pages,
        services::create_service_page,
        services::get_service_page,
        services::update_service_page,
        services::delete_service_page,
        promos::list_promos,
        promos::create_promo,
        promos::get_promo,
        promos::update_promo,
        promos::delete_promo,
        social_trust::list_social_trusts,
        social_trust::create_social_trust,
        social_trust::get_social_trust,
        social_trust::update_social_trust,
        social_trust::delete_social_trust,
    ),
    tags(
        (name = "users", description = "Admin and editor accounts. Editors only see their own account."),
        (name = "authors", description = "Author profiles shown as article publishers."),
        (name = "categories", description = "Blog categories."),
        (name = "articles", description = "Blog posts. Editors are limited to articles of their own author profile."),
        (name = "products", description = "Product pages with features, why-us cards and FAQs."),
        (name = "solutions", description = "Solution pages with features, why-us rows, related products and FAQs."),
        (name = "services", description = "Service pages built from optional, layout-dependent sections."),
        (name = "promos", description = "Promotional banners."),
        (name = "social_trust", description = "Partner logos for the \"trusted by\" strip."),
    )
)]
pub struct AdminApiDoc;
