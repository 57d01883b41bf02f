//! 阈值配置内存实现

use crate::error::StorageError;
use crate::models::{ThresholdRecord, ThresholdTable};
use crate::traits::ThresholdStore;
use std::sync::RwLock;

/// 阈值配置内存存储
pub struct InMemoryThresholdStore {
    table: RwLock<ThresholdTable>,
}

impl InMemoryThresholdStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(ThresholdTable::default()),
        }
    }
}

impl Default for InMemoryThresholdStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ThresholdStore for InMemoryThresholdStore {
    async fn list_thresholds(&self) -> Result<ThresholdTable, StorageError> {
        let table = self
            .table
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(table.clone())
    }

    async fn find_threshold(&self, key: &str) -> Result<Option<ThresholdRecord>, StorageError> {
        let table = self
            .table
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(table.entries.get(key).cloned())
    }

    async fn put_threshold(&self, key: &str, record: ThresholdRecord) -> Result<(), StorageError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        table.entries.insert(key.to_string(), record);
        Ok(())
    }

    async fn set_update_required(&self, required: bool) -> Result<(), StorageError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        table.update_required = required;
        Ok(())
    }
}
