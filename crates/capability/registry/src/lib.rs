//! 设备登记与配置能力。
//!
//! - [`DeviceRegistry`]：按 MAC 登记、手动映射、软删除、初始化、心跳与传感器上报
//! - [`ThresholdService`]：占用判定阈值（设备 -> 默认 -> 兜底）
//! - [`ApiLogger`]：有界 API 请求日志

mod api_log;
mod devices;
mod error;
mod thresholds;

pub use api_log::{ApiLogEntry, ApiLogger};
pub use devices::{
    DeviceFieldsUpdate, DeviceMapping, DeviceRegistry, HealthPing, InitOutcome, MappingList,
    Registration, SensorReading,
};
pub use error::RegistryError;
pub use thresholds::{ResolvedThreshold, ThresholdService, ThresholdSource};
