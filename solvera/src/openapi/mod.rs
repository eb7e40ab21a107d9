//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] is the document served at `/admin/docs`. It carries the authentication routes at
//! the root and nests the two API surfaces:
//! - [`admin::AdminApiDoc`]: Management API at `/admin/api/v1/*`
//! - [`public::PublicApiDoc`]: Site API at `/api/v1/*`

pub mod admin;
pub mod public;

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;
pub use admin::AdminApiDoc;
pub use public::PublicApiDoc;

/// Session and cron security schemes shared by every nested document.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.security_schemes.insert(
            "BearerAuth".to_string(),
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("The `access_token` returned by `POST /authentication/login`."))
                    .build(),
            ),
        );
        components.security_schemes.insert(
            "CookieAuth".to_string(),
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "solvera_session",
                "Session cookie set by `POST /authentication/login`.",
            ))),
        );
        components.security_schemes.insert(
            "CronSecret".to_string(),
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("The configured `cron_secret`. Not required when no secret is configured."))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Solvera Content API",
        description = "Admin and public APIs for the Solvera marketing site."
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::me,
        api::handlers::public::root,
        api::handlers::public::healthz,
    ),
    nest(
        (path = "/admin/api/v1", api = AdminApiDoc),
        (path = "/api/v1", api = PublicApiDoc),
    ),
    tags(
        (name = "authentication", description = "Username and password login. Sessions are JWTs delivered as a cookie and in the response body."),
    )
)]
pub struct ApiDoc;
