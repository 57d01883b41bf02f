//! 用户与管理员口令内存实现
//!
//! 仅用于本地演示和测试。首个注册用户成为管理员，不内置默认账户。

use crate::error::StorageError;
use crate::models::{AdminConfigRecord, UserRecord};
use crate::traits::{AdminConfigStore, UserStore};
use std::collections::HashMap;
use std::sync::RwLock;

/// 用户内存存储
///
/// 使用 RwLock + HashMap 提供线程安全的内存存储。
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError> {
        Ok(self
            .users
            .read()
            .ok()
            .and_then(|map| map.get(username).cloned()))
    }

    async fn create_user(&self, record: UserRecord) -> Result<bool, StorageError> {
        let mut map = self
            .users
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if map.contains_key(&record.username) {
            return Ok(false);
        }
        map.insert(record.username.clone(), record);
        Ok(true)
    }

    async fn count_users(&self) -> Result<usize, StorageError> {
        let map = self
            .users
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(map.len())
    }
}

/// 管理员口令内存存储
pub struct InMemoryAdminConfigStore {
    config: RwLock<Option<AdminConfigRecord>>,
}

impl InMemoryAdminConfigStore {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(None),
        }
    }
}

impl Default for InMemoryAdminConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AdminConfigStore for InMemoryAdminConfigStore {
    async fn get_admin_config(&self) -> Result<Option<AdminConfigRecord>, StorageError> {
        let config = self
            .config
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(config.clone())
    }

    async fn set_admin_config(&self, record: AdminConfigRecord) -> Result<(), StorageError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        *config = Some(record);
        Ok(())
    }
}
