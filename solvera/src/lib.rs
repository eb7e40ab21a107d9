//! # solvera: content backend for the Solvera marketing site
//!
//! `solvera` stores and serves the content of a corporate marketing site: products, solutions,
//! service pages, blog articles, promo banners and partner logos. Editors manage content through
//! an authenticated admin API; the site itself reads a public, read-only API.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL (through SQLx) for all persistence. Uploaded images live in external blob
//! storage; content rows only hold their URLs.
//!
//! ### Request Flow
//!
//! #### Admin API (`/admin/api/v1/*`)
//!
//! Requests are authenticated from a session JWT, carried either in the session cookie set by
//! `POST /authentication/login` or as a bearer token. The [`auth::permissions`] extractors then
//! check the caller's role against the resource and operation. Admins manage everything; editors
//! write blog articles under their own author profile and can read the rest.
//!
//! #### Public API (`/api/v1/*`)
//!
//! Unauthenticated reads for the site. Responses are wrapped in a `{success, data, error}`
//! envelope, and lookups go by slug rather than ID.
//!
//! #### Cron (`/api/v1/cron/cleanup-images`)
//!
//! Called by the hosting platform's scheduler. Deletes every stored image that no content row
//! references any more, see [`cleanup`].
//!
//! ## Configuration
//!
//! See [`config`] for the YAML file and environment variable layering.
//!
//! ## Getting Started
//!
//! ```no_run
//! use solvera::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = solvera::config::Args { config: "config.yaml".into(), validate: false };
//!     let config = Config::load(&args)?;
//!     solvera::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async { tokio::signal::ctrl_c().await.ok(); }).await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cleanup;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod slugs;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    auth::password::hash_password,
    cleanup::blob_store::{BlobStore, VercelBlobStore},
    config::{CorsOrigin, PoolSettings},
    db::{
        handlers::{Repository, Users},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    openapi::ApiDoc,
    types::UserId,
};
use anyhow::Context;
use axum::{
    Router,
    http::{self, HeaderValue},
    routing::{delete, get, patch, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .blob_store(Arc::new(VercelBlobStore::new(&config.blob)?))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Storage holding uploaded images, used by the cleanup cron
    pub blob_store: Arc<dyn BlobStore>,
}

/// Get the solvera database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the bootstrap admin account if it doesn't exist.
///
/// Idempotent: when an account with `username` already exists it is restored to the admin role
/// and its password is reset to `password` (if given). A new account always gets the admin role.
/// Without a password no account is created.
#[instrument(skip_all, fields(username = %username))]
pub async fn create_initial_admin_user(username: &str, password: Option<&str>, db: &PgPool) -> anyhow::Result<Option<UserId>> {
    let password_hash = password
        .map(hash_password)
        .transpose()
        .context("Failed to hash admin password")?;

    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing_user) = user_repo.get_by_username(username).await? {
        let demoted = existing_user.role != Role::Admin;
        if demoted || password_hash.is_some() {
            user_repo
                .update(
                    existing_user.id,
                    &UserUpdateDBRequest {
                        password_hash,
                        role: demoted.then_some(Role::Admin),
                        ..Default::default()
                    },
                )
                .await?;
            info!(restored_role = demoted, "Updated bootstrap admin account");
        }
        tx.commit().await?;
        return Ok(Some(existing_user.id));
    }

    let Some(password_hash) = password_hash else {
        info!("No admin password configured, skipping bootstrap admin account");
        return Ok(None);
    };

    let created_user = user_repo
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            password_hash,
            role: Role::Admin,
            author_id: None,
        })
        .await
        .context("Failed to create admin user")?;

    tx.commit().await?;
    info!("Created bootstrap admin account");
    Ok(Some(created_user.id))
}

/// Install aws-lc-rs as the process-wide rustls provider. Later calls are no-ops.
///
/// `reqwest` is built without a bundled provider, so this must run before the first blob store
/// client is constructed.
pub fn install_crypto_provider() {
    if rustls::crypto::aws_lc_rs::default_provider().install_default().is_err() {
        debug!("rustls crypto provider already installed");
    }
}

fn pool_options(settings: &PoolSettings) -> PgPoolOptions {
    let seconds = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(seconds(settings.idle_timeout_secs))
        .max_lifetime(seconds(settings.max_lifetime_secs))
}

async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = pool_options(&config.database.pool)
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;
    migrator().run(&pool).await?;

    create_initial_admin_user(&config.admin_username, config.admin_password.as_deref(), &pool)
        .await
        .context("Failed to create initial admin user")?;

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allowed = &config.auth.security.cors.allowed_origins;
    let allow_origin = if allowed.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in allowed {
            if let CorsOrigin::Url(url) = origin {
                // Url serializes a bare origin with a trailing slash, browsers send it without
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::PATCH, http::Method::DELETE])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(config.auth.security.cors.allow_credentials)
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// - Authentication routes at `/authentication/*`
/// - Admin API at `/admin/api/v1`
/// - Public API and cron at `/api/v1`
/// - API reference at `/admin/docs`
/// - Optional Prometheus metrics at `/internal/metrics`
/// - CORS and tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    use api::handlers::{articles, auth, authors, categories, cron, products, promos, public, services, social_trust, solutions, users};

    let auth_routes = Router::new()
        .route("/authentication/login", post(auth::login))
        .route("/authentication/logout", post(auth::logout))
        .route("/authentication/me", get(auth::me))
        .with_state(state.clone());

    let admin_routes = Router::new()
        // Accounts (admin only, except an editor's own record)
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", patch(users::update_user))
        .route("/users/{id}", delete(users::delete_user))
        // Blog
        .route("/authors", get(authors::list_authors))
        .route("/authors", post(authors::create_author))
        .route("/authors/{id}", get(authors::get_author))
        .route("/authors/{id}", patch(authors::update_author))
        .route("/authors/{id}", delete(authors::delete_author))
        .route("/categories", get(categories::list_categories))
        .route("/categories", post(categories::create_category))
        .route("/categories/{id}", get(categories::get_category))
        .route("/categories/{id}", patch(categories::update_category))
        .route("/categories/{id}", delete(categories::delete_category))
        .route("/articles", get(articles::list_articles))
        .route("/articles", post(articles::create_article))
        .route("/articles/{id}", get(articles::get_article))
        .route("/articles/{id}", patch(articles::update_article))
        .route("/articles/{id}", delete(articles::delete_article))
        // Marketing pages
        .route("/products", get(products::list_products))
        .route("/products", post(products::create_product))
        .route("/products/{id}", get(products::get_product))
        .route("/products/{id}", patch(products::update_product))
        .route("/products/{id}", delete(products::delete_product))
        .route("/solutions", get(solutions::list_solutions))
        .route("/solutions", post(solutions::create_solution))
        .route("/solutions/{id}", get(solutions::get_solution))
        .route("/solutions/{id}", patch(solutions::update_solution))
        .route("/solutions/{id}", delete(solutions::delete_solution))
        .route("/services", get(services::list_service_pages))
        .route("/services", post(services::create_service_page))
        .route("/services/{id}", get(services::get_service_page))
        .route("/services/{id}", patch(services::update_service_page))
        .route("/services/{id}", delete(services::delete_service_page))
        // Site furniture
        .route("/promos", get(promos::list_promos))
        .route("/promos", post(promos::create_promo))
        .route("/promos/{id}", get(promos::get_promo))
        .route("/promos/{id}", patch(promos::update_promo))
        .route("/promos/{id}", delete(promos::delete_promo))
        .route("/social-trusts", get(social_trust::list_social_trusts))
        .route("/social-trusts", post(social_trust::create_social_trust))
        .route("/social-trusts/{id}", get(social_trust::get_social_trust))
        .route("/social-trusts/{id}", patch(social_trust::update_social_trust))
        .route("/social-trusts/{id}", delete(social_trust::delete_social_trust))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/products", get(public::list_products))
        .route("/products/{slug}", get(public::get_product))
        .route("/solutions", get(public::list_solutions))
        .route("/solutions/{slug}", get(public::get_solution))
        .route("/services", get(public::list_service_pages))
        .route("/services/{slug}", get(public::get_service_page))
        .route("/articles", get(public::list_articles))
        .route("/articles/{slug}", get(public::get_article))
        .route("/promo", get(public::get_active_promo))
        .route("/social-trust", get(public::get_social_trust))
        .route("/cron/cleanup-images", get(cron::cleanup_images))
        .with_state(state.clone());

    let router = Router::new()
        .route("/", get(public::root))
        .route("/healthz", get(public::healthz))
        .merge(auth_routes)
        .nest("/admin/api/v1", admin_routes)
        .nest("/api/v1", public_routes)
        .merge(Scalar::with_url("/admin/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The HTTP server and the resources it owns.
///
/// 1. **Initialize**: [`Application::new`] connects to the database, runs migrations and
///    bootstraps the admin account
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal resolves, in-flight requests finish and the pool is
///    closed
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting solvera with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        install_crypto_provider();
        let blob_store = VercelBlobStore::new(&config.blob)?;

        let app_state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .blob_store(Arc::new(blob_store))
            .build();

        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Solvera listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::create_initial_admin_user;
    use crate::{
        api::models::users::Role,
        auth::password::verify_password,
        config::CorsOrigin,
        db::{
            handlers::{Repository, Users},
            models::users::UserUpdateDBRequest,
        },
        test_utils::{create_test_app, create_test_app_with, create_test_config},
    };
    use axum::http::StatusCode;
    use serde_json::Value;
    use sqlx::PgPool;
    use std::sync::Arc;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_initial_admin_user_is_idempotent(pool: PgPool) {
        let first = create_initial_admin_user("admin", Some("first-password"), &pool)
            .await
            .unwrap()
            .unwrap();
        let second = create_initial_admin_user("admin", Some("second-password"), &pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, second);

        let mut conn = pool.acquire().await.unwrap();
        let user = Users::new(&mut conn).get_by_username("admin").await.unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(verify_password("second-password", &user.password_hash).unwrap());
        assert!(!verify_password("first-password", &user.password_hash).unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bootstrap_restores_admin_role(pool: PgPool) {
        let id = create_initial_admin_user("admin", Some("password123"), &pool)
            .await
            .unwrap()
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        Users::new(&mut conn)
            .update(
                id,
                &UserUpdateDBRequest {
                    role: Some(Role::Editor),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // restart without a password still promotes the account back
        assert_eq!(create_initial_admin_user("admin", None, &pool).await.unwrap(), Some(id));

        let user = Users::new(&mut conn).get_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(verify_password("password123", &user.password_hash).unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_no_password_skips_bootstrap(pool: PgPool) {
        assert_eq!(create_initial_admin_user("admin", None, &pool).await.unwrap(), None);

        let mut conn = pool.acquire().await.unwrap();
        assert!(Users::new(&mut conn).get_by_username("admin").await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_root_and_health(pool: PgPool) {
        let app = create_test_app(pool).await;

        let body: Value = app.get("/").await.json();
        assert_eq!(body["status"], "ok");

        let response = app.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");

        app.get("/admin/docs").await.assert_status_ok();
        app.get("/admin/api/v1/nope").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cors_allows_configured_origin(pool: PgPool) {
        let mut config = create_test_config();
        config.auth.security.cors.allowed_origins = vec![CorsOrigin::Url("https://www.solvera.id".parse().unwrap())];
        let app = create_test_app_with(pool, config, Arc::new(crate::cleanup::blob_store::InMemoryBlobStore::default())).await;

        let response = app.get("/api/v1/products").add_header("origin", "https://www.solvera.id").await;
        response.assert_status_ok();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://www.solvera.id"
        );
    }
}
