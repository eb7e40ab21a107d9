use axum::{Json, extract::State};

use crate::{
    AppState,
    api::{
        extract::AppJson,
        models::{
            auth::{AuthResponse, AuthSuccessResponse, LoginRequest, LoginResponse, LogoutResponse},
            users::{CurrentUser, UserResponse},
        },
    },
    auth::{password, session},
    db::handlers::{Repository, Users},
    errors::Error,
};

fn invalid_credentials() -> Error {
    Error::Unauthenticated {
        message: Some("Invalid username or password".to_string()),
    }
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, AppJson(request): AppJson<LoginRequest>) -> Result<LoginResponse, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    let user = user_repo.get_by_username(&request.username).await?.ok_or_else(invalid_credentials)?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(invalid_credentials());
    }

    let user = user_repo.record_login(user.id).await?;

    let current_user = CurrentUser::from(user.clone());
    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = session::create_session_cookie(&token, &state.config);

    let auth_response = AuthResponse {
        user: UserResponse::from(user),
        message: "Login successful".to_string(),
        access_token: token,
    };

    Ok(LoginResponse { auth_response, cookie })
}

/// Logout (clear session)
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    let auth_response = AuthSuccessResponse {
        message: "Logout successful".to_string(),
    };

    Ok(LogoutResponse {
        auth_response,
        cookie: session::clear_session_cookie(&state.config),
    })
}

/// The account behind the current session
#[utoipa::path(
    get,
    path = "/authentication/me",
    tag = "authentication",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %current_user.id))]
pub async fn me(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // the token may outlive the account
    let user = Users::new(&mut pool_conn)
        .get_by_id(current_user.id)
        .await?
        .ok_or(Error::Unauthenticated { message: None })?;

    Ok(Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{TEST_PASSWORD, add_auth_headers, create_test_app, create_test_user};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_sets_cookie_and_returns_token(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, Role::Editor).await;

        let response = app
            .post("/authentication/login")
            .json(&json!({"username": user.username, "password": TEST_PASSWORD}))
            .await;

        response.assert_status_ok();
        let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap().to_string();
        assert!(cookie.starts_with("solvera_session="));
        assert!(cookie.contains("HttpOnly"));

        let body: AuthResponse = response.json();
        assert_eq!(body.user.id, user.id);
        assert!(body.user.last_login.is_some());

        // the returned token works as a bearer token
        let response = app
            .get("/authentication/me")
            .authorization_bearer(&body.access_token)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<UserResponse>().username, user.username);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_rejects_bad_credentials(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, Role::Admin).await;

        for (username, password) in [(user.username.as_str(), "wrong-password"), ("nobody", TEST_PASSWORD)] {
            let response = app
                .post("/authentication/login")
                .json(&json!({"username": username, "password": password}))
                .await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            let body: Value = response.json();
            assert_eq!(body["error"]["message"], "Invalid username or password");
            assert_eq!(body["error"]["code"], "HTTP_401");
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_malformed_body(pool: PgPool) {
        let app = create_test_app(pool).await;
        let response = app.post("/authentication/login").json(&json!({"username": "admin"})).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_logout_expires_cookie(pool: PgPool) {
        let app = create_test_app(pool).await;
        let response = app.post("/authentication/logout").await;

        response.assert_status_ok();
        let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
        assert_eq!(response.json::<AuthSuccessResponse>().message, "Logout successful");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_me_requires_session(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        app.get("/authentication/me").await.assert_status(StatusCode::UNAUTHORIZED);

        let user = create_test_user(&pool, Role::Admin).await;
        let (name, value) = add_auth_headers(&user);
        let response = app.get("/authentication/me").add_header(name, value).await;
        response.assert_status_ok();
        assert_eq!(response.json::<UserResponse>().role, Role::Admin);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_me_after_account_deleted(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, Role::Editor).await;
        let (name, value) = add_auth_headers(&user);

        sqlx::query("DELETE FROM users WHERE id = $1").bind(user.id).execute(&pool).await.unwrap();

        app.get("/authentication/me")
            .add_header(name, value)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
