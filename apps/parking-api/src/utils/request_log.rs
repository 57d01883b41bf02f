//! 设备与配置接口的请求日志。

use crate::AppState;
use domain::now_epoch_ms;
use parking_registry::ApiLogEntry;
use serde_json::Value;

/// 记录一次接口调用；`error` 为 None 表示成功。
pub async fn record_api_call(
    state: &AppState,
    device_id: &str,
    endpoint: &str,
    method: &str,
    body: &Value,
    error: Option<String>,
) {
    let entry = ApiLogEntry {
        device_id,
        endpoint,
        method,
        body,
        success: error.is_none(),
        error_message: error,
    };
    state.api_log.record(entry, now_epoch_ms()).await;
}
