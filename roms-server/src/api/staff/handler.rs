//! Staff API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{Role, User, UserCreate, UserUpdate};

use crate::auth::CurrentUser;
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::repository::{RepoError, user};
use crate::utils::validation::{MAX_EMAIL_LEN, MAX_NAME_LEN, required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

const MIN_PASSWORD_LEN: usize = 6;

fn user_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found"))
        .with_detail("user_id", id)
}

fn check_assignable(role: Role) -> AppResult<()> {
    if role == Role::Admin {
        return Err(AppError::new(ErrorCode::RoleNotAssignable).with_detail("role", role.as_str()));
    }
    Ok(())
}

fn check_password(password: &str) -> AppResult<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ))
        .with_detail("field", "password"));
    }
    hash_password(password).map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Validate and insert a waiter / kitchen account (shared with self-registration)
pub(crate) async fn new_account(
    state: &ServerState,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> AppResult<User> {
    check_assignable(role)?;
    let username = required_text(username, "username", MAX_NAME_LEN)?.to_string();
    let email = required_text(email, "email", MAX_EMAIL_LEN)?.to_string();
    if !email.contains('@') {
        return Err(AppError::validation("Invalid email address").with_detail("field", "email"));
    }

    let pool = &state.db.pool;
    if user::exists_by_username(pool, &username).await? {
        return Err(AppError::new(ErrorCode::UsernameExists).with_detail("username", username));
    }
    if user::exists_by_email(pool, &email).await? {
        return Err(AppError::new(ErrorCode::EmailExists).with_detail("email", email));
    }

    let hash = check_password(password)?;
    let user = user::create(pool, &username, &email, &hash, role)
        .await
        .map_err(|e| match e {
            // 并发注册时由唯一索引兜底
            RepoError::Duplicate(_) => AppError::conflict("Username or email already exists"),
            other => other.into(),
        })?;
    Ok(user)
}

/// GET /api/staff - 服务员与后厨账号
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(user::find_staff(&state.db.pool).await?))
}

/// POST /api/staff
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = new_account(
        &state,
        &payload.username,
        &payload.email,
        &payload.password,
        payload.role,
    )
    .await?;
    tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "Staff member created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/staff/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    if let Some(role) = payload.role {
        check_assignable(role)?;
    }
    let username = payload
        .username
        .as_deref()
        .map(|u| required_text(u, "username", MAX_NAME_LEN).map(str::to_string))
        .transpose()?;
    let email = payload
        .email
        .as_deref()
        .map(|e| required_text(e, "email", MAX_EMAIL_LEN).map(str::to_string))
        .transpose()?;
    let password_hash = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(check_password)
        .transpose()?;

    let changes = user::UserChanges {
        username,
        email,
        password_hash,
        role: payload.role,
    };
    let user = user::update(&state.db.pool, id, changes)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => user_not_found(id),
            RepoError::Duplicate(_) => AppError::conflict("Username or email already exists"),
            other => other.into(),
        })?;

    tracing::info!(user_id = id, "Staff member updated");
    Ok(Json(user))
}

/// DELETE /api/staff/{id}
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    if current.id == id {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }
    if !user::delete(&state.db.pool, id).await? {
        return Err(user_not_found(id));
    }
    tracing::info!(user_id = id, deleted_by = current.id, "Staff member deleted");
    Ok(ApiResponse::ok())
}
