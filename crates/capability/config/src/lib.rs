//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    /// 未配置时使用内存后端。
    pub redis_url: Option<String>,
    pub redis_prefix: String,
    pub jwt_secret: String,
    pub jwt_session_ttl_seconds: u64,
    pub heartbeat_timeout_ms: u64,
    pub discovery_timeout_ms: u64,
    pub liveness_interval_seconds: u64,
    pub kill_switch: bool,
    pub api_log_capacity: usize,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("PARKING_JWT_SECRET")
            .map_err(|_| ConfigError::Missing("PARKING_JWT_SECRET".to_string()))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Invalid(
                "PARKING_JWT_SECRET".to_string(),
                jwt_secret,
            ));
        }
        let jwt_session_ttl_seconds = read_u64_with_default("PARKING_JWT_SESSION_TTL_SECONDS", 900)?;
        let http_addr =
            env::var("PARKING_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let redis_url = read_optional("PARKING_REDIS_URL");
        let redis_prefix = env::var("PARKING_REDIS_PREFIX").unwrap_or_else(|_| "sparking".to_string());
        let heartbeat_timeout_ms = read_u64_with_default("PARKING_HEARTBEAT_TIMEOUT_MS", 40_000)?;
        let discovery_timeout_ms = read_u64_with_default("PARKING_DISCOVERY_TIMEOUT_MS", 65_000)?;
        let liveness_interval_seconds =
            read_u64_with_default("PARKING_LIVENESS_INTERVAL_SECONDS", 30)?;
        if liveness_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "PARKING_LIVENESS_INTERVAL_SECONDS".to_string(),
                "0".to_string(),
            ));
        }
        let kill_switch = read_bool_with_default("PARKING_KILL_SWITCH", false);
        let api_log_capacity = read_u64_with_default("PARKING_API_LOG_CAPACITY", 40)? as usize;

        Ok(Self {
            http_addr,
            redis_url,
            redis_prefix,
            jwt_secret,
            jwt_session_ttl_seconds,
            heartbeat_timeout_ms,
            discovery_timeout_ms,
            liveness_interval_seconds,
            kill_switch,
            api_log_capacity,
        })
    }
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
