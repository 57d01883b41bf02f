//! 看板账号 handlers
//!
//! - POST /api/auth/register - 注册（首个用户成为管理员并设定管理员口令）
//! - POST /api/auth/login - 登录，签发会话 token
//! - POST /api/auth/refresh-session - 用有效 token 换取新 token（需认证）
//! - GET /api/auth/checkAdminConfig - 管理员口令是否已设置
//! - POST /api/auth/setAdminPassword - 修改管理员口令（需认证）

use crate::AppState;
use crate::middleware::{bearer_token, require_session};
use crate::utils::normalize_required;
use crate::utils::response::{auth_error, internal_auth_error};
use api_contract::{
    AdminConfigResponse, ApiResponse, LoginRequest, RegisterRequest, SessionResponse,
    SetAdminPasswordRequest, UserDto,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::now_epoch_ms;

/// 注册看板用户
pub async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> Response {
    let username = match normalize_required(req.username, "username") {
        Ok(username) => username,
        Err(response) => return response,
    };
    match state
        .auth
        .register(
            &username,
            &req.password,
            req.admin_password.as_deref(),
            now_epoch_ms(),
        )
        .await
    {
        Ok(user) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(UserDto {
                username: user.username,
                is_admin: user.is_admin,
                created_at: user.created_at,
            })),
        )
            .into_response(),
        Err(err) => internal_auth_error(err),
    }
}

/// 登录
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    match state.auth.login(&req.username, &req.password).await {
        Ok((user, session)) => (
            StatusCode::OK,
            Json(ApiResponse::success(SessionResponse {
                token: session.token,
                expires_at: session.expires_at,
                username: user.username,
                is_admin: user.is_admin,
            })),
        )
            .into_response(),
        Err(err) => internal_auth_error(err),
    }
}

/// 刷新会话
pub async fn refresh_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return auth_error(StatusCode::UNAUTHORIZED);
    };
    let session = match state.auth.refresh_session(token).await {
        Ok(session) => session,
        Err(err) => return internal_auth_error(err),
    };
    // 新 token 携带重新读取的用户身份
    match state.auth.verify_session(&session.token) {
        Ok(ctx) => (
            StatusCode::OK,
            Json(ApiResponse::success(SessionResponse {
                token: session.token,
                expires_at: session.expires_at,
                username: ctx.username,
                is_admin: ctx.is_admin,
            })),
        )
            .into_response(),
        Err(err) => internal_auth_error(err),
    }
}

/// 管理员口令配置状态
pub async fn check_admin_config(State(state): State<AppState>) -> Response {
    match state.auth.admin_password_set().await {
        Ok(admin_password_set) => (
            StatusCode::OK,
            Json(ApiResponse::success(AdminConfigResponse { admin_password_set })),
        )
            .into_response(),
        Err(err) => internal_auth_error(err),
    }
}

/// 修改管理员口令（需校验当前用户口令）
pub async fn set_admin_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SetAdminPasswordRequest>,
) -> Response {
    let ctx = match require_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    match state
        .auth
        .set_admin_password(
            &ctx,
            &req.admin_password,
            &req.current_user_password,
            now_epoch_ms(),
        )
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(AdminConfigResponse {
                admin_password_set: true,
            })),
        )
            .into_response(),
        Err(err) => internal_auth_error(err),
    }
}
