//! Test utilities for integration testing.

use crate::{
    AppState,
    api::models::{
        authors::{AuthorCreate, AuthorResponse},
        users::{CurrentUser, Role, UserResponse},
    },
    auth::{
        password::{Argon2Params, hash_password_with_params},
        session,
    },
    cleanup::blob_store::{BlobStore, InMemoryBlobStore},
    config::Config,
    db::{
        handlers::{Authors, Repository, Users},
        models::users::UserCreateDBRequest,
    },
    types::AuthorId,
};
use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use axum_test::TestServer;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Password of every account made by [`create_test_user`] and [`create_test_editor`].
pub const TEST_PASSWORD: &str = "password123";

/// Argon2 parameters small enough to keep test logins fast.
const FAST_ARGON2: Argon2Params = Argon2Params {
    memory_kib: 1024,
    iterations: 1,
    parallelism: 1,
};

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    };
    config.auth.session.cookie_secure = false;
    config
}

/// Test server over the full router, with an empty in-memory blob store.
pub async fn create_test_app(pool: PgPool) -> TestServer {
    create_test_app_with(pool, create_test_config(), Arc::new(InMemoryBlobStore::default())).await
}

pub async fn create_test_app_with(pool: PgPool, config: Config, blob_store: Arc<dyn BlobStore>) -> TestServer {
    crate::install_crypto_provider();
    let state = AppState::builder().db(pool).config(config).blob_store(blob_store).build();
    let router = crate::build_router(&state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

async fn insert_user(pool: &PgPool, prefix: &str, role: Role, author_id: Option<AuthorId>) -> UserResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let user_create = UserCreateDBRequest {
        username: format!("{prefix}_{}", Uuid::new_v4().simple()),
        password_hash: hash_password_with_params(TEST_PASSWORD, Some(FAST_ARGON2)).expect("Failed to hash test password"),
        role,
        author_id,
    };

    let user = Users::new(&mut conn).create(&user_create).await.expect("Failed to create test user");
    UserResponse::from(user)
}

pub async fn create_test_user(pool: &PgPool, role: Role) -> UserResponse {
    insert_user(pool, "testuser", role, None).await
}

pub async fn create_test_author(pool: &PgPool, name: &str) -> AuthorResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let author = Authors::new(&mut conn)
        .create(&AuthorCreate {
            name: name.to_string(),
            photo_url: None,
        })
        .await
        .expect("Failed to create test author");
    AuthorResponse::from(author)
}

/// An editor account linked to a fresh author profile.
pub async fn create_test_editor(pool: &PgPool) -> (UserResponse, AuthorResponse) {
    let author = create_test_author(pool, "Test Editor").await;
    let user = insert_user(pool, "testeditor", Role::Editor, Some(author.id)).await;
    (user, author)
}

/// Bearer header carrying a session token for `user`, signed with [`create_test_config`]'s key.
pub fn add_auth_headers(user: &UserResponse) -> (HeaderName, HeaderValue) {
    let current_user = CurrentUser {
        id: user.id,
        username: user.username.clone(),
        role: user.role,
        author_id: user.author_id,
    };
    let token = session::create_session_token(&current_user, &create_test_config()).expect("Failed to create session token");
    let value = HeaderValue::from_str(&format!("Bearer {token}")).expect("Invalid header value");
    (AUTHORIZATION, value)
}
