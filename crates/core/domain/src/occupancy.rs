//! 距离读数到车位状态的映射。

use crate::ParkingStatus;

/// 未配置任何阈值时使用的兜底阈值（厘米）。
pub const DEFAULT_THRESHOLD_CM: i64 = 45;

/// 阈值上限（厘米）。
pub const MAX_THRESHOLD_CM: i64 = 200;

/// 由超声波距离换算车位状态。
///
/// - `distance <= 0`：传感器异常，状态未知
/// - `distance <= threshold`：有车
/// - 其他：空闲
pub fn parking_status_from_distance(distance_cm: i64, threshold_cm: i64) -> ParkingStatus {
    if distance_cm <= 0 {
        return ParkingStatus::Unknown;
    }
    if distance_cm <= threshold_cm {
        ParkingStatus::Occupied
    } else {
        ParkingStatus::Open
    }
}
