//! 认证能力：看板用户注册、登录、会话 JWT 与管理员口令。
//!
//! 规则：
//! - 首个注册用户成为管理员，其口令同时设为管理员口令
//! - 之后的注册必须提供正确的管理员口令
//! - 修改管理员口令需要有效会话，并再次校验当前用户口令

mod jwt;
mod password;

use async_trait::async_trait;
use domain::SessionContext;
use parking_storage::{AdminConfigRecord, AdminConfigStore, UserRecord, UserStore};
use std::sync::Arc;

pub use jwt::JwtManager;
pub use password::{hash_password, verify_password};

/// 认证相关错误。
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid admin password")]
    AdminPasswordInvalid,
    #[error("username already exists")]
    UsernameTaken,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("internal error: {0}")]
    Internal(String),
}

/// 会话 token 及过期时间（秒级时间戳）。
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: u64,
}

/// 认证服务实现（基于 UserStore + AdminConfigStore + JWT）。
pub struct AuthService {
    user_store: Arc<dyn UserStore>,
    admin_store: Arc<dyn AdminConfigStore>,
    jwt: JwtManager,
}

impl AuthService {
    /// 创建认证服务实例。
    pub fn new(
        user_store: Arc<dyn UserStore>,
        admin_store: Arc<dyn AdminConfigStore>,
        jwt: JwtManager,
    ) -> Self {
        Self {
            user_store,
            admin_store,
            jwt,
        }
    }

    /// 管理员口令是否已设置。
    pub async fn admin_password_set(&self) -> Result<bool, AuthError> {
        let config = self
            .admin_store
            .get_admin_config()
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        Ok(config.is_some())
    }

    /// 注册用户。
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        admin_password: Option<&str>,
        now_ms: i64,
    ) -> Result<UserRecord, AuthError> {
        let username = normalize_username(username)?;
        if password.is_empty() {
            return Err(AuthError::InvalidInput("password required".to_string()));
        }

        let admin_config = self
            .admin_store
            .get_admin_config()
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        let is_first_registration = admin_config.is_none();
        if let Some(config) = admin_config {
            let admin_password = admin_password.unwrap_or_default();
            if !verify_password(&config.admin_password_hash, admin_password)? {
                tracing::warn!(
                    target: "parking.auth",
                    event = "register_rejected",
                    username = %username,
                    "invalid admin password"
                );
                return Err(AuthError::AdminPasswordInvalid);
            }
        }

        let record = UserRecord {
            username: username.clone(),
            password_hash: hash_password(password)?,
            created_at: now_ms,
            is_admin: is_first_registration,
        };
        let created = self
            .user_store
            .create_user(record.clone())
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        if !created {
            return Err(AuthError::UsernameTaken);
        }

        if is_first_registration {
            self.admin_store
                .set_admin_config(AdminConfigRecord {
                    admin_password_hash: hash_password(password)?,
                    updated_at: now_ms,
                    updated_by: username.clone(),
                })
                .await
                .map_err(|err| AuthError::Internal(err.to_string()))?;
        }

        tracing::info!(
            target: "parking.auth",
            event = "user_registered",
            username = %username,
            is_admin = record.is_admin
        );
        Ok(record)
    }

    /// 登录校验并签发会话 token。
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(UserRecord, SessionToken), AuthError> {
        let user = self
            .user_store
            .find_by_username(username.trim())
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(&user.password_hash, password)? {
            return Err(AuthError::InvalidCredentials);
        }
        let ctx = SessionContext::new(user.username.clone(), user.is_admin);
        let token = self.jwt.issue_session(&ctx)?;
        Ok((user, token))
    }

    /// 校验会话 token 并提取 SessionContext。
    pub fn verify_session(&self, token: &str) -> Result<SessionContext, AuthError> {
        self.jwt.decode_session(token)
    }

    /// 延长会话：用仍有效的 token 换取新 token。
    pub async fn refresh_session(&self, token: &str) -> Result<SessionToken, AuthError> {
        let ctx = self.jwt.decode_session(token)?;
        let user = self
            .user_store
            .find_by_username(&ctx.username)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?
            .ok_or(AuthError::TokenInvalid)?;
        self.jwt
            .issue_session(&SessionContext::new(user.username, user.is_admin))
    }

    /// 设置管理员口令。
    pub async fn set_admin_password(
        &self,
        ctx: &SessionContext,
        admin_password: &str,
        current_user_password: &str,
        now_ms: i64,
    ) -> Result<(), AuthError> {
        if admin_password.is_empty() {
            return Err(AuthError::InvalidInput("adminPassword required".to_string()));
        }
        let user = self
            .user_store
            .find_by_username(&ctx.username)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(&user.password_hash, current_user_password)? {
            return Err(AuthError::InvalidCredentials);
        }
        self.admin_store
            .set_admin_config(AdminConfigRecord {
                admin_password_hash: hash_password(admin_password)?,
                updated_at: now_ms,
                updated_by: user.username.clone(),
            })
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?;
        tracing::info!(
            target: "parking.auth",
            event = "admin_password_set",
            username = %user.username
        );
        Ok(())
    }
}

fn normalize_username(username: &str) -> Result<String, AuthError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidInput("username required".to_string()));
    }
    if trimmed.contains('/') {
        return Err(AuthError::InvalidInput("username must not contain '/'".to_string()));
    }
    Ok(trimmed.to_string())
}

/// 认证能力 trait，便于替换实现与测试。
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn admin_password_set(&self) -> Result<bool, AuthError>;
    async fn register(
        &self,
        username: &str,
        password: &str,
        admin_password: Option<&str>,
        now_ms: i64,
    ) -> Result<UserRecord, AuthError>;
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(UserRecord, SessionToken), AuthError>;
    fn verify_session(&self, token: &str) -> Result<SessionContext, AuthError>;
    async fn refresh_session(&self, token: &str) -> Result<SessionToken, AuthError>;
    async fn set_admin_password(
        &self,
        ctx: &SessionContext,
        admin_password: &str,
        current_user_password: &str,
        now_ms: i64,
    ) -> Result<(), AuthError>;
}

#[async_trait]
impl Authenticator for AuthService {
    async fn admin_password_set(&self) -> Result<bool, AuthError> {
        self.admin_password_set().await
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
        admin_password: Option<&str>,
        now_ms: i64,
    ) -> Result<UserRecord, AuthError> {
        self.register(username, password, admin_password, now_ms).await
    }

    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(UserRecord, SessionToken), AuthError> {
        self.login(username, password).await
    }

    fn verify_session(&self, token: &str) -> Result<SessionContext, AuthError> {
        self.verify_session(token)
    }

    async fn refresh_session(&self, token: &str) -> Result<SessionToken, AuthError> {
        self.refresh_session(token).await
    }

    async fn set_admin_password(
        &self,
        ctx: &SessionContext,
        admin_password: &str,
        current_user_password: &str,
        now_ms: i64,
    ) -> Result<(), AuthError> {
        self.set_admin_password(ctx, admin_password, current_user_password, now_ms)
            .await
    }
}
