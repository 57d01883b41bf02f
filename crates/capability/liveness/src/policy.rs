//! 在线判定策略参数。

/// 默认心跳超时（毫秒）。
pub const DEFAULT_HEARTBEAT_TIMEOUT_MS: u64 = 40_000;

/// 默认发现模式超时（毫秒）。
pub const DEFAULT_DISCOVERY_TIMEOUT_MS: u64 = 65_000;

/// 在线判定策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessPolicy {
    /// 距最近心跳不超过该值视为在线（含边界）
    pub heartbeat_timeout_ms: u64,
    /// 发现模式持续超过该值自动关闭（不含边界）
    pub discovery_timeout_ms: u64,
}

impl LivenessPolicy {
    pub fn new(heartbeat_timeout_ms: u64, discovery_timeout_ms: u64) -> Self {
        Self {
            heartbeat_timeout_ms,
            discovery_timeout_ms,
        }
    }
}

impl Default for LivenessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_HEARTBEAT_TIMEOUT_MS, DEFAULT_DISCOVERY_TIMEOUT_MS)
    }
}
