//! 设备目录接口
//!
//! 设备目录是一棵两层的键值树：顶层键为设备键（`Device1`、`Devicemaster`）
//! 或保留键（`DeviceCount`），值为 JSON。
//!
//! 批量写入使用字段路径 `<key>/<field>`，一次调用内的所有路径原子生效；
//! 不含 `/` 的路径整体替换顶层键的值；值为 `null` 表示删除该字段。

use crate::error::StorageError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

/// 全量快照：顶层键 -> JSON 值。
pub type DirectorySnapshot = BTreeMap<String, Value>;

/// 批量字段写入：路径 -> 新值。
pub type FieldWrites = BTreeMap<String, Value>;

/// 设备目录存储接口
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// 读取全量快照（无分页）
    async fn get_all(&self) -> Result<DirectorySnapshot, StorageError>;

    /// 读取单个顶层键
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// 整体替换单个顶层键
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// 原子批量写入字段路径
    async fn update(&self, writes: FieldWrites) -> Result<(), StorageError>;
}

/// 拆分字段路径为（顶层键，字段名）。
pub fn split_path(path: &str) -> Result<(&str, Option<&str>), StorageError> {
    let (key, field) = match path.split_once('/') {
        Some((key, field)) => (key, Some(field)),
        None => (path, None),
    };
    if key.is_empty() {
        return Err(StorageError::new(format!("invalid path: {path}")));
    }
    match field {
        Some(field) if field.is_empty() || field.contains('/') => {
            Err(StorageError::new(format!("invalid path: {path}")))
        }
        _ => Ok((key, field)),
    }
}

/// 校验整批路径；任一路径非法则整批拒绝。
pub fn validate_writes(writes: &FieldWrites) -> Result<(), StorageError> {
    for path in writes.keys() {
        split_path(path)?;
    }
    Ok(())
}
