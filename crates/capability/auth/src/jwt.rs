use crate::{AuthError, SessionToken};
use domain::SessionContext;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
/// JWT 内部 claims。
struct Claims {
    sub: String,
    is_admin: bool,
    exp: usize,
    iat: usize,
    jti: String,
}

/// 会话 JWT 生成与校验。
pub struct JwtManager {
    secret: Vec<u8>,
    session_ttl_seconds: u64,
}

impl JwtManager {
    /// 创建 JWT 管理器。
    pub fn new(secret: String, session_ttl_seconds: u64) -> Self {
        Self {
            secret: secret.into_bytes(),
            session_ttl_seconds,
        }
    }

    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    /// 基于 SessionContext 签发会话 token。
    pub fn issue_session(&self, ctx: &SessionContext) -> Result<SessionToken, AuthError> {
        let now = now_epoch_seconds();
        let expires_at = now + self.session_ttl_seconds;
        let claims = Claims {
            sub: ctx.username.clone(),
            is_admin: ctx.is_admin,
            exp: expires_at as usize,
            iat: now as usize,
            // 同一秒内多次签发也得到不同的 token
            jti: Uuid::new_v4().to_string(),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|err| AuthError::Internal(err.to_string()))?;
        Ok(SessionToken { token, expires_at })
    }

    /// 解析会话 token。
    pub fn decode_session(&self, token: &str) -> Result<SessionContext, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        let decoded = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &validation,
        )
        .map_err(map_jwt_error)?;
        Ok(SessionContext::new(decoded.claims.sub, decoded.claims.is_admin))
    }
}

/// 当前时间戳（秒）。
fn now_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// 将 jwt 库错误映射为业务错误。
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid,
    }
}
