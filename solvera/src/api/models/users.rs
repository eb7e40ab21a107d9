//! API request/response models for users.

use super::pagination::Pagination;
use crate::db::models::users::UserDBResponse;
use crate::types::{AuthorId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Account role. Admins manage everything; editors write blog articles under their own author
/// profile and can read the rest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub author_id: Option<AuthorId>,
}

fn default_role() -> Role {
    Role::Editor
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub username: Option<String>,
    /// New password. The only field an editor may change, and only on their own account.
    pub password: Option<String>,
    pub role: Option<Role>,
    /// `null` unlinks the author profile; omitting the field leaves it unchanged.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = "uuid")]
    pub author_id: Option<Option<AuthorId>>,
}

impl UserUpdate {
    /// True when the request changes anything other than the password.
    pub fn touches_profile(&self) -> bool {
        self.username.is_some() || self.role.is_some() || self.author_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub username: String,
    pub role: Role,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub author_id: Option<AuthorId>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters for listing users
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListUsersQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Case-insensitive substring match on username
    pub search: Option<String>,

    /// Only users with this role
    pub role: Option<Role>,
}

/// The authenticated caller, as carried in the session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub username: String,
    pub role: Role,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub author_id: Option<AuthorId>,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            role: db.role,
            author_id: db.author_id,
            last_login: db.last_login,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            role: db.role,
            author_id: db.author_id,
        }
    }
}
