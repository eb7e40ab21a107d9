//! OpenAPI documentation for the site API (`/api/v1/*`).

use utoipa::OpenApi;

use crate::api::handlers::{cron, public};

#[derive(OpenApi)]
#[openapi(
    paths(
        public::list_products,
        public::get_product,
        public::list_solutions,
        public::get_solution,
        public::list_service_pages,
        public::get_service_page,
        public::list_articles,
        public::get_article,
        public::get_active_promo,
        public::get_social_trust,
        cron::cleanup_images,
    ),
    tags(
        (name = "public", description = "Read-only content for the marketing site, wrapped in `{success, data, error}`."),
        (name = "cron", description = "Maintenance jobs triggered by the hosting platform."),
    )
)]
pub struct PublicApiDoc;
