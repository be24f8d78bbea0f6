//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State, http::StatusCode};
use shared::models::{LoginRequest, LoginResponse, RegisterRequest, Role, User};

use crate::api::staff::new_account;
use crate::auth::CurrentUser;
use crate::auth::password::verify_password;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};

/// Fixed delay before answering a login, so timing does not reveal which emails exist
const AUTH_FIXED_DELAY_MS: u64 = 200;

fn issue_token(state: &ServerState, user: &User) -> AppResult<String> {
    state
        .get_jwt_service()
        .generate_token(user)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = req.email.trim().to_string();
    let record = user::find_record_by_email(&state.db.pool, &email).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // 统一错误信息，不区分"用户不存在"和"密码错误"
    let record = match record {
        Some(r) if verify_password(&req.password, &r.password_hash) => r,
        Some(_) => {
            security_log!(WARN, "login_failed", email = %email, reason = "invalid_password");
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!(WARN, "login_failed", email = %email, reason = "user_not_found");
            return Err(AppError::invalid_credentials());
        }
    };

    let user = User::from(record);
    let token = issue_token(&state, &user)?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = %user.role,
        "User logged in successfully"
    );
    Ok(Json(LoginResponse { token, user }))
}

/// POST /api/auth/register
///
/// Self-service sign-up for floor and kitchen staff; admins are only seeded.
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<LoginResponse>)> {
    let role = req.role.unwrap_or(Role::Waiter);
    if role == Role::Admin {
        security_log!(WARN, "register_admin_rejected", email = %req.email);
        return Err(AppError::new(ErrorCode::RoleNotAssignable).with_detail("role", role.as_str()));
    }

    let user = new_account(&state, &req.username, &req.email, &req.password, role).await?;
    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = user.id, username = %user.username, role = %user.role, "User registered");
    Ok((StatusCode::CREATED, Json(LoginResponse { token, user })))
}

/// GET /api/auth/me
pub async fn me(State(state): State<ServerState>, current: CurrentUser) -> AppResult<Json<User>> {
    let user = user::find_by_id(&state.db.pool, current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("user_id", current.id))?;
    Ok(Json(user))
}
