//! 存储接口 Trait 定义
//!
//! 定义设备目录之外的异步存储接口：
//! - ThresholdStore：占用阈值配置
//! - UserStore：看板用户
//! - AdminConfigStore：管理员口令
//! - ApiLogStore：API 请求日志（有界）
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{AdminConfigRecord, ApiLogRecord, ThresholdRecord, ThresholdTable, UserRecord};
use async_trait::async_trait;

/// 阈值配置存储接口
#[async_trait]
pub trait ThresholdStore: Send + Sync {
    /// 读取全部阈值
    async fn list_thresholds(&self) -> Result<ThresholdTable, StorageError>;

    /// 读取单个阈值（`default` 或设备键）
    async fn find_threshold(&self, key: &str) -> Result<Option<ThresholdRecord>, StorageError>;

    /// 写入单个阈值
    async fn put_threshold(&self, key: &str, record: ThresholdRecord) -> Result<(), StorageError>;

    /// 设置“需下发”标记
    async fn set_update_required(&self, required: bool) -> Result<(), StorageError>;
}

/// 用户存储接口
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 根据用户名查找用户
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError>;

    /// 创建用户；用户名已存在返回 false
    async fn create_user(&self, record: UserRecord) -> Result<bool, StorageError>;

    /// 用户总数
    async fn count_users(&self) -> Result<usize, StorageError>;
}

/// 管理员口令存储接口
#[async_trait]
pub trait AdminConfigStore: Send + Sync {
    async fn get_admin_config(&self) -> Result<Option<AdminConfigRecord>, StorageError>;

    async fn set_admin_config(&self, record: AdminConfigRecord) -> Result<(), StorageError>;
}

/// API 请求日志存储接口
///
/// 容量有限，超出容量时淘汰最旧的条目。
#[async_trait]
pub trait ApiLogStore: Send + Sync {
    /// 追加一条日志
    async fn append(&self, record: ApiLogRecord) -> Result<(), StorageError>;

    /// 按时间倒序列出最近的日志
    async fn list_recent(&self, limit: usize) -> Result<Vec<ApiLogRecord>, StorageError>;
}
