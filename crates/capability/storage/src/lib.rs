//! # Parking Storage 模块
//!
//! 本模块提供停车系统的数据存储抽象层，支持内存与 Redis 两种后端。
//!
//! ## 架构设计
//!
//! 1. **设备目录** (`directory.rs`)：以设备键为顶层的 JSON 键值树，支持原子批量字段写入
//! 2. **接口抽象层** (`traits.rs`)：阈值、用户、管理员口令、API 日志的异步 Trait
//! 3. **数据模型层** (`models.rs`)：目录之外的存储数据结构
//! 4. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 5. **实现层**：
//!    - `in_memory/`：内存存储实现（测试、演示及未配置 Redis 时的默认后端）
//!    - `redis`：Redis 存储实现（生产环境使用）
//!
//! ## 核心约束
//!
//! - 目录的批量写入在一次调用内整体生效或整体失败，读者不会看到半批结果
//! - API 日志容量有限，超出后淘汰最旧条目
//! - 存储层只做持久化，不解释设备字段含义；字段语义由 `domain` 定义
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use parking_storage::{DeviceDirectory, FieldWrites, InMemoryDeviceDirectory};
//! use serde_json::json;
//!
//! let directory = InMemoryDeviceDirectory::new();
//! let mut writes = FieldWrites::new();
//! writes.insert("Device1/isOnline".to_string(), json!(true));
//! directory.update(writes).await?;
//! ```

pub mod directory;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod redis;
pub mod traits;

pub use directory::*;
pub use error::*;
pub use models::*;
pub use traits::*;

pub use in_memory::{
    DEFAULT_API_LOG_CAPACITY, InMemoryAdminConfigStore, InMemoryApiLogStore,
    InMemoryDeviceDirectory, InMemoryThresholdStore, InMemoryUserStore,
};
pub use crate::redis::{DEFAULT_REDIS_PREFIX, RedisDeviceDirectory, RedisThresholdStore, RedisUserStore};
