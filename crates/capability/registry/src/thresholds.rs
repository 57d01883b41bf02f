//! 占用判定阈值配置。
//!
//! 查找顺序：设备阈值 -> 默认阈值 -> 兜底值 45 cm。

use crate::error::RegistryError;
use domain::{DEFAULT_THRESHOLD_CM, DeviceId, MAX_THRESHOLD_CM};
use parking_storage::{DEFAULT_THRESHOLD_KEY, ThresholdRecord, ThresholdStore, ThresholdTable};
use std::sync::Arc;
use tracing::info;

/// 阈值来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdSource {
    Device,
    Default,
    Fallback,
}

impl ThresholdSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Device => "device",
            Self::Default => "default",
            Self::Fallback => "fallback",
        }
    }
}

/// 解析后的生效阈值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedThreshold {
    pub value: i64,
    pub updated_at: Option<i64>,
    pub source: ThresholdSource,
}

/// 阈值配置服务。
pub struct ThresholdService {
    store: Arc<dyn ThresholdStore>,
}

impl ThresholdService {
    pub fn new(store: Arc<dyn ThresholdStore>) -> Self {
        Self { store }
    }

    /// 读取全部阈值；缺少默认阈值时写入 45 cm。
    pub async fn list(&self, now_ms: i64) -> Result<ThresholdTable, RegistryError> {
        let mut table = self.store.list_thresholds().await?;
        if !table.entries.contains_key(DEFAULT_THRESHOLD_KEY) {
            let record = ThresholdRecord {
                value: DEFAULT_THRESHOLD_CM,
                updated_at: now_ms,
            };
            self.store
                .put_threshold(DEFAULT_THRESHOLD_KEY, record.clone())
                .await?;
            table
                .entries
                .insert(DEFAULT_THRESHOLD_KEY.to_string(), record);
        }
        Ok(table)
    }

    /// 设置默认阈值（`device` 为 None）或设备阈值。
    ///
    /// 修改默认阈值会置位 `updateRequired`，提示主机重新下发。
    pub async fn set(
        &self,
        value: i64,
        device: Option<DeviceId>,
        now_ms: i64,
    ) -> Result<ThresholdRecord, RegistryError> {
        if !(0..=MAX_THRESHOLD_CM).contains(&value) {
            return Err(RegistryError::invalid(format!(
                "Threshold value must be between 0 and {MAX_THRESHOLD_CM} cm"
            )));
        }
        let key = match device {
            Some(id) => id.key().to_string(),
            None => DEFAULT_THRESHOLD_KEY.to_string(),
        };
        let record = ThresholdRecord {
            value,
            updated_at: now_ms,
        };
        self.store.put_threshold(&key, record.clone()).await?;
        if device.is_none() {
            self.store.set_update_required(true).await?;
        }
        info!(target: "parking.registry", event = "threshold_updated", key = %key, value);
        Ok(record)
    }

    /// 解析设备的生效阈值。
    pub async fn resolve(&self, id: DeviceId) -> Result<ResolvedThreshold, RegistryError> {
        if let Some(record) = self.store.find_threshold(&id.key().to_string()).await? {
            return Ok(ResolvedThreshold {
                value: record.value,
                updated_at: Some(record.updated_at),
                source: ThresholdSource::Device,
            });
        }
        if let Some(record) = self.store.find_threshold(DEFAULT_THRESHOLD_KEY).await? {
            return Ok(ResolvedThreshold {
                value: record.value,
                updated_at: Some(record.updated_at),
                source: ThresholdSource::Default,
            });
        }
        Ok(ResolvedThreshold {
            value: DEFAULT_THRESHOLD_CM,
            updated_at: None,
            source: ThresholdSource::Fallback,
        })
    }
}
