pub mod device;
pub mod fields;
pub mod occupancy;
pub mod validation;

pub use device::{DeviceId, DeviceKey, DeviceRecord, ParkingStatus, SystemStatus};
pub use occupancy::{
    DEFAULT_THRESHOLD_CM, MAX_THRESHOLD_CM, parking_status_from_distance,
};
pub use validation::is_valid_mac_address;

/// 保留键：记录已分配的最大数字设备 ID，不是设备记录。
pub const DEVICE_COUNT_KEY: &str = "DeviceCount";

/// 会话上下文：登录用户的身份信息，由会话 token 解析得到。
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub username: String,
    pub is_admin: bool,
}

impl SessionContext {
    /// 构造会话上下文。
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            username: username.into(),
            is_admin,
        }
    }
}

/// 当前时间戳（毫秒）。
pub fn now_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
