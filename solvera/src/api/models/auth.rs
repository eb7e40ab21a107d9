//! Authentication request/response models.

use crate::api::models::users::UserResponse;
use axum::{
    Json,
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub message: String,
    /// Session token, also set as a cookie. Send it as `Authorization: Bearer <token>`
    /// from non-browser clients.
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSuccessResponse {
    pub message: String,
}

/// Successful login: JSON body plus the session cookie.
#[derive(Debug)]
pub struct LoginResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        ([(header::SET_COOKIE, self.cookie)], Json(self.auth_response)).into_response()
    }
}

/// Logout: JSON body plus an expired session cookie.
#[derive(Debug)]
pub struct LogoutResponse {
    pub auth_response: AuthSuccessResponse,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        ([(header::SET_COOKIE, self.cookie)], Json(self.auth_response)).into_response()
    }
}
