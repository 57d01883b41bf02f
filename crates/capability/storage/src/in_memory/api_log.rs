//! API 请求日志内存实现
//!
//! 固定容量的追加缓冲：写满后淘汰最旧的条目。

use crate::error::StorageError;
use crate::models::ApiLogRecord;
use crate::traits::ApiLogStore;
use std::collections::VecDeque;
use std::sync::RwLock;

/// 默认容量
pub const DEFAULT_API_LOG_CAPACITY: usize = 40;

/// API 请求日志内存存储
pub struct InMemoryApiLogStore {
    capacity: usize,
    logs: RwLock<VecDeque<ApiLogRecord>>,
}

impl InMemoryApiLogStore {
    /// 创建指定容量的日志缓冲（容量至少为 1）
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            logs: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryApiLogStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_API_LOG_CAPACITY)
    }
}

#[async_trait::async_trait]
impl ApiLogStore for InMemoryApiLogStore {
    async fn append(&self, record: ApiLogRecord) -> Result<(), StorageError> {
        let mut logs = self
            .logs
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        while logs.len() >= self.capacity {
            logs.pop_front();
        }
        logs.push_back(record);
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ApiLogRecord>, StorageError> {
        let logs = self
            .logs
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(logs.iter().rev().take(limit).cloned().collect())
    }
}
