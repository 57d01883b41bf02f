//! 设备目录内存实现
//!
//! 用于本地演示和测试，也是未配置 Redis 时的默认后端。
//!
//! 功能：
//! - 全量快照读取
//! - 单键读写
//! - 批量字段写入在同一把写锁内完成，对读者原子可见

use crate::directory::{DeviceDirectory, DirectorySnapshot, FieldWrites, split_path, validate_writes};
use crate::error::StorageError;
use serde_json::{Map, Value};
use std::sync::RwLock;

/// 设备目录内存存储
///
/// 使用 RwLock + BTreeMap 提供线程安全的内存存储。
pub struct InMemoryDeviceDirectory {
    nodes: RwLock<DirectorySnapshot>,
}

impl InMemoryDeviceDirectory {
    /// 创建空目录
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(DirectorySnapshot::new()),
        }
    }

    /// 以给定快照初始化（测试用）
    pub fn with_snapshot(snapshot: DirectorySnapshot) -> Self {
        Self {
            nodes: RwLock::new(snapshot),
        }
    }
}

impl Default for InMemoryDeviceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DeviceDirectory for InMemoryDeviceDirectory {
    async fn get_all(&self) -> Result<DirectorySnapshot, StorageError> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(nodes.clone())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(nodes.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        if key.is_empty() || key.contains('/') {
            return Err(StorageError::new(format!("invalid key: {key}")));
        }
        let mut nodes = self
            .nodes
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if value.is_null() {
            nodes.remove(key);
        } else {
            nodes.insert(key.to_string(), value);
        }
        Ok(())
    }

    async fn update(&self, writes: FieldWrites) -> Result<(), StorageError> {
        validate_writes(&writes)?;
        let mut nodes = self
            .nodes
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        for (path, value) in writes {
            let (key, field) = split_path(&path)?;
            match field {
                None if value.is_null() => {
                    nodes.remove(key);
                }
                None => {
                    nodes.insert(key.to_string(), value);
                }
                Some(field) => {
                    let node = nodes
                        .entry(key.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if !node.is_object() {
                        *node = Value::Object(Map::new());
                    }
                    if let Value::Object(map) = node {
                        if value.is_null() {
                            map.remove(field);
                        } else {
                            map.insert(field.to_string(), value);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
