use crate::{
    AppState,
    api::{
        extract::AppJson,
        models::{
            pagination::{PaginatedResponse, normalize_search},
            users::{CurrentUser, ListUsersQuery, Role, UserCreate, UserResponse, UserUpdate},
        },
    },
    auth::{
        password,
        permissions::{RequiresPermission, can_read_all_resources, has_permission, operation, resource},
    },
    db::{
        handlers::{Repository, Users, users::UserFilter},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{Operation, Resource, UserId},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

fn user_not_found(id: UserId) -> Error {
    Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
        message: None,
    }
}

/// Editors only ever see their own account.
fn ensure_visible(current_user: &CurrentUser, id: UserId) -> Result<()> {
    if can_read_all_resources(current_user, Resource::Users) || current_user.id == id {
        Ok(())
    } else {
        Err(user_not_found(id))
    }
}

async fn hash(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    description = "Admins see every account; editors see only their own.",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Paginated list of users", body = PaginatedResponse<UserResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
    current_user: RequiresPermission<resource::Users, operation::ReadOwn>,
) -> Result<Json<PaginatedResponse<UserResponse>>> {
    let (skip, limit) = query.pagination.params();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    if !can_read_all_resources(&current_user, Resource::Users) {
        let own: Vec<UserResponse> = repo
            .get_by_id(current_user.id)
            .await?
            .into_iter()
            .map(UserResponse::from)
            .collect();
        let total = own.len() as i64;
        let page = own.into_iter().skip(skip as usize).take(limit as usize).collect();
        return Ok(Json(PaginatedResponse::new(page, total, skip, limit)));
    }

    let mut filter = UserFilter::new(skip, limit);
    if let Some(search) = normalize_search(query.search.as_deref()) {
        filter = filter.with_search(search);
    }
    if let Some(role) = query.role {
        filter = filter.with_role(role);
    }

    let users = repo.list(&filter).await?;
    let total_count = repo.count(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        users.into_iter().map(UserResponse::from).collect(),
        total_count,
        skip,
        limit,
    )))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Create user",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid password or author"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Username taken"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(username = %request.username))]
pub async fn create_user(
    State(state): State<AppState>,
    _: RequiresPermission<resource::Users, operation::CreateAll>,
    AppJson(request): AppJson<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    if request.username.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Username must not be empty".to_string(),
        });
    }
    password::validate_password(&request.password, &state.config.auth.password)?;

    let db_request = UserCreateDBRequest {
        username: request.username,
        password_hash: hash(request.password).await?,
        role: request.role,
        author_id: request.author_id,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn).create(&db_request).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    summary = "Get user",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %id))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    current_user: RequiresPermission<resource::Users, operation::ReadOwn>,
) -> Result<Json<UserResponse>> {
    ensure_visible(&current_user, id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn).get_by_id(id).await?.ok_or_else(|| user_not_found(id))?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    summary = "Update user",
    description = "Editors may only change their own password.",
    request_body = UserUpdate,
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid password, or the change would leave no admin"),
        (status = 403, description = "Editors may only change their password"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %id))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    current_user: RequiresPermission<resource::Users, operation::UpdateOwn>,
    AppJson(request): AppJson<UserUpdate>,
) -> Result<Json<UserResponse>> {
    let can_update_all = has_permission(&current_user, Resource::Users, Operation::UpdateAll);
    if !can_update_all {
        ensure_visible(&current_user, id)?;
        if request.touches_profile() {
            return Err(Error::InsufficientPermissions {
                resource: Resource::Users,
                action: Operation::UpdateAll,
            });
        }
    }

    let password_hash = match request.password {
        Some(new_password) => {
            password::validate_password(&new_password, &state.config.auth.password)?;
            Some(hash(new_password).await?)
        }
        None => None,
    };

    if let Some(username) = &request.username
        && username.trim().is_empty()
    {
        return Err(Error::BadRequest {
            message: "Username must not be empty".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut tx);

    let existing = repo.get_by_id(id).await?.ok_or_else(|| user_not_found(id))?;
    if existing.role == Role::Admin && request.role == Some(Role::Editor) && repo.count_other_admins(id).await? == 0 {
        return Err(Error::BadRequest {
            message: "Cannot demote the last admin account".to_string(),
        });
    }

    let db_request = UserUpdateDBRequest {
        username: request.username,
        password_hash,
        role: request.role,
        author_id: request.author_id,
    };
    let user = repo.update(id, &db_request).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    summary = "Delete user",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found"),
    ),
    security(
        ("BearerAuth" = []),
        ("CookieAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %id))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    current_user: RequiresPermission<resource::Users, operation::DeleteAll>,
) -> Result<StatusCode> {
    if current_user.id == id {
        return Err(Error::BadRequest {
            message: "You cannot delete your own account".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Users::new(&mut conn).delete(id).await? {
        return Err(user_not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}
