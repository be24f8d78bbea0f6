//! 认证中间件
//!
//! 为 JWT 认证和角色授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;
use shared::models::Role;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{AppError, ErrorCode};

/// 无需登录的 API 路由
///
/// 顾客设备没有账号：浏览菜单、下单、轮询本桌订单、呼叫服务员、
/// 提交评价以及订阅事件都必须匿名可用。
pub fn is_public_route(method: &Method, path: &str) -> bool {
    let Some(rest) = path.strip_prefix("/api/") else {
        return false;
    };
    let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["auth", "login" | "register"]) => true,
        ("GET", ["menu"] | ["menu", _] | ["menu", _, "ingredients"]) => true,
        ("GET", ["inventory", "check", _]) => true,
        ("GET", ["tables"]) => true,
        ("POST", ["tables", _, "call-waiter"]) => true,
        ("POST", ["orders"]) => true,
        ("GET", ["orders", "table", _]) => true,
        ("POST", ["feedback"]) => true,
        ("GET", ["feedback", "table", _]) => true,
        ("GET", ["events", "ws"]) => true,
        _ => false,
    }
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，
/// 成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的请求
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (`/health` 等)
/// - [`is_public_route`] 列出的公共接口
///
/// # 错误处理
///
/// | 错误 | 错误码 |
/// |------|--------|
/// | 无 Authorization 头 | NotAuthenticated |
/// | 令牌过期 | TokenExpired |
/// | 无效令牌 | TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") || is_public_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!(WARN, "auth_missing", uri = %req.uri());
            return Err(AppError::unauthorized());
        }
    };

    let claims = state.get_jwt_service().validate_token(token).map_err(|e| {
        security_log!(WARN, "auth_failed", error = %e, uri = %req.uri());
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    let user = CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 角色检查中间件 - 要求当前用户属于给定角色之一
///
/// ```ignore
/// Router::new()
///     .route("/{id}/attend", post(handler::attend))
///     .layer(middleware::from_fn(require_role(&[Role::Waiter, Role::Admin])));
/// ```
///
/// 未登录返回 401，角色不符返回 403 (`RoleRequired`)。
pub fn require_role(
    roles: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::unauthorized)?;

            if !user.has_role(roles) {
                security_log!(
                    WARN,
                    "role_denied",
                    user_id = user.id,
                    username = %user.username,
                    user_role = %user.role,
                    uri = %req.uri()
                );
                let allowed: Vec<&str> = roles.iter().map(Role::as_str).collect();
                return Err(AppError::with_message(
                    ErrorCode::RoleRequired,
                    format!("Requires one of roles: {}", allowed.join(", ")),
                )
                .with_detail("allowed_roles", allowed));
            }

            Ok(next.run(req).await)
        })
    }
}

/// 管理员中间件 - 要求管理员角色
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::unauthorized)?;

    if !user.is_admin() {
        security_log!(
            WARN,
            "admin_required",
            user_id = user.id,
            username = %user.username,
            user_role = %user.role,
            uri = %req.uri()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}
