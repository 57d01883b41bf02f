//! 内存存储实现模块
//!
//! 包含以下实现：
//! - DeviceDirectory: InMemoryDeviceDirectory
//! - ThresholdStore: InMemoryThresholdStore
//! - UserStore / AdminConfigStore: InMemoryUserStore / InMemoryAdminConfigStore
//! - ApiLogStore: InMemoryApiLogStore

pub mod api_log;
pub mod directory;
pub mod threshold;
pub mod user;

pub use api_log::*;
pub use directory::*;
pub use threshold::*;
pub use user::*;
