//! 输入验证辅助函数
//!
//! - normalize_required：必填字段去除空格并检查非空
//! - parse_device_id：设备 ID（`master` 或正整数）
//! - parse_mac_address：MAC 地址（`AA:BB:CC:DD:EE:FF` 或 `-` 分隔）
//! - decode_body：将原始 JSON 请求体解析为 DTO
//!
//! 失败返回 bad_request_error 响应

use crate::utils::response::bad_request_error;
use axum::response::Response;
use domain::{DeviceId, is_valid_mac_address};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// 验证必填字段，去除空格并检查非空
pub fn normalize_required(value: String, field: &str) -> Result<String, Response> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(bad_request_error(format!("{field} required")));
    }
    Ok(trimmed.to_string())
}

/// 解析设备 ID
pub fn parse_device_id(raw: &str) -> Result<DeviceId, Response> {
    DeviceId::parse(raw.trim()).ok_or_else(|| bad_request_error("Invalid device ID"))
}

/// 校验 MAC 地址格式
pub fn parse_mac_address(raw: &str) -> Result<String, Response> {
    let trimmed = raw.trim();
    if !is_valid_mac_address(trimmed) {
        return Err(bad_request_error("Invalid MAC address format"));
    }
    Ok(trimmed.to_string())
}

/// 解析请求体；保留原始 JSON 以便写入请求日志
pub fn decode_body<T: DeserializeOwned>(body: &Value) -> Result<T, Response> {
    serde_json::from_value(body.clone())
        .map_err(|err| bad_request_error(format!("Invalid request body: {err}")))
}
