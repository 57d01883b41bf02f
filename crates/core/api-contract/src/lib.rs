//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 请求体中的设备 ID：固件发送数字，看板发送字符串。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DeviceIdInput {
    Number(i64),
    Text(String),
}

impl DeviceIdInput {
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(id) => id.to_string(),
            Self::Text(raw) => raw.trim().to_string(),
        }
    }
}

// ---- 设备上报 ----

/// 心跳请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthPingRequest {
    pub device_id: Option<DeviceIdInput>,
    pub system_status: Option<String>,
    pub discovery_mode: Option<bool>,
    pub physical_override: Option<bool>,
}

/// 心跳响应。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthPingResponse {
    pub device_id: String,
    pub timestamp: i64,
}

/// 传感器上报请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorUpdateRequest {
    pub distance: Option<f64>,
    pub has_sensor_error: Option<bool>,
}

/// 按 MAC 登记的响应。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub device_id: u32,
    pub mac_address: String,
    pub is_new_device: bool,
}

/// 设备初始化响应。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitDeviceResponse {
    pub device_id: String,
    pub created: bool,
    pub data: Value,
}

/// 单设备阈值响应。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceThresholdResponse {
    pub device_id: String,
    pub threshold: i64,
    pub updated_at: Option<i64>,
    pub source: String,
}

// ---- 看板 ----

/// 看板修改设备字段的请求体。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdateRequest {
    pub parking_status: Option<String>,
    pub sensor_error: Option<bool>,
    pub system_status: Option<String>,
}

/// 看板修改设备字段的响应。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUpdateResponse {
    pub device_id: String,
    pub updated: Value,
}

/// 设备映射。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMappingDto {
    pub mac_address: String,
    pub device_id: u32,
    pub registered_at: Option<i64>,
}

/// 映射列表响应。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingListResponse {
    pub mappings: Vec<DeviceMappingDto>,
    pub next_id: Option<u32>,
}

/// 手动映射请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRequest {
    pub mac_address: Option<String>,
    pub device_id: Option<DeviceIdInput>,
}

/// 删除映射的查询参数。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingQuery {
    pub mac_address: Option<String>,
}

/// 阈值记录。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdDto {
    pub value: i64,
    pub updated_at: i64,
}

/// 阈值表响应：`thresholds` 以 `default` / `Device3` 为键。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdTableResponse {
    pub thresholds: std::collections::BTreeMap<String, ThresholdDto>,
    pub update_required: bool,
}

/// 设置阈值请求体；缺省 `deviceId` 表示默认阈值。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRequest {
    pub value: Option<i64>,
    pub device_id: Option<DeviceIdInput>,
}

/// 设置阈值响应。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdUpdateResponse {
    pub key: String,
    pub value: i64,
    pub updated_at: i64,
}

/// 手动触发巡检的结果。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateResponse {
    pub devices_checked: usize,
    pub fields_written: usize,
    pub went_online: usize,
    pub went_offline: usize,
    pub timers_refreshed: usize,
}

/// 日志查询参数。
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<usize>,
}

/// API 请求日志条目。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLogDto {
    pub id: String,
    pub device_id: String,
    pub endpoint: String,
    pub method: String,
    pub body: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub timestamp: i64,
}

/// 紧急停止状态。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KillSwitchResponse {
    pub enabled: bool,
}

/// 紧急停止开启时的拒绝响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KillSwitchRejection {
    pub kill_switch_enabled: bool,
}

// ---- 账号 ----

/// 注册请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub admin_password: Option<String>,
}

/// 登录请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 用户信息。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub username: String,
    pub is_admin: bool,
    pub created_at: i64,
}

/// 登录 / 刷新会话响应。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: u64,
    pub username: String,
    pub is_admin: bool,
}

/// 管理员口令配置状态。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfigResponse {
    pub admin_password_set: bool,
}

/// 设置管理员口令请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAdminPasswordRequest {
    pub admin_password: String,
    pub current_user_password: String,
}

/// 删除映射的响应。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRemovedResponse {
    pub mac_address: String,
    pub device_id: u32,
}

/// 进程内指标快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub reconcile_passes: u64,
    pub reconcile_failures: u64,
    pub reconcile_latency_ms_total: u64,
    pub reconcile_latency_ms_count: u64,
    pub fields_written: u64,
    pub devices_went_online: u64,
    pub devices_went_offline: u64,
    pub timer_refreshes: u64,
    pub health_pings: u64,
    pub sensor_updates: u64,
    pub registrations: u64,
    pub kill_switch_rejections: u64,
}
