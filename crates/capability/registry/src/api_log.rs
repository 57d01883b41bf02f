//! API 请求日志记录。
//!
//! 日志写入失败只记录告警，不影响请求本身。

use parking_storage::{ApiLogRecord, ApiLogStore, StorageError};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// 一次待记录的请求。
#[derive(Debug, Clone)]
pub struct ApiLogEntry<'a> {
    pub device_id: &'a str,
    pub endpoint: &'a str,
    pub method: &'a str,
    pub body: &'a Value,
    pub success: bool,
    pub error_message: Option<String>,
}

/// API 请求日志服务。
pub struct ApiLogger {
    store: Arc<dyn ApiLogStore>,
}

impl ApiLogger {
    pub fn new(store: Arc<dyn ApiLogStore>) -> Self {
        Self { store }
    }

    /// 追加一条日志。
    pub async fn record(&self, entry: ApiLogEntry<'_>, now_ms: i64) {
        let body = match entry.body {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        };
        let record = ApiLogRecord {
            id: Uuid::new_v4().to_string(),
            device_id: entry.device_id.to_string(),
            endpoint: entry.endpoint.to_string(),
            method: entry.method.to_string(),
            body,
            success: entry.success,
            error_message: entry.error_message,
            timestamp: now_ms,
        };
        if let Err(err) = self.store.append(record).await {
            warn!(
                target: "parking.api_log",
                event = "api_log_append_failed",
                endpoint = entry.endpoint,
                error = %err
            );
        }
    }

    /// 最近的日志（新的在前）。
    pub async fn recent(&self, limit: usize) -> Result<Vec<ApiLogRecord>, StorageError> {
        self.store.list_recent(limit).await
    }
}
