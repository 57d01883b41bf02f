//! 数据模型
//!
//! 定义设备目录之外的存储数据模型：
//! - 阈值配置：ThresholdRecord, ThresholdTable
//! - 用户与管理员口令：UserRecord, AdminConfigRecord
//! - API 请求日志：ApiLogRecord

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 阈值表中默认阈值的键。
pub const DEFAULT_THRESHOLD_KEY: &str = "default";

/// 占用判定阈值（厘米）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRecord {
    pub value: i64,
    pub updated_at: i64,
}

/// 阈值表：`default` 与各设备键（`Device3`）-> 阈值。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdTable {
    pub entries: BTreeMap<String, ThresholdRecord>,
    /// 默认阈值变更后置位，由主机拉取并下发给从机后清除。
    pub update_required: bool,
}

/// 看板用户记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub created_at: i64,
    pub is_admin: bool,
}

/// 管理员口令配置（新用户注册需校验）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfigRecord {
    pub admin_password_hash: String,
    pub updated_at: i64,
    pub updated_by: String,
}

/// API 请求日志条目。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLogRecord {
    pub id: String,
    pub device_id: String,
    pub endpoint: String,
    pub method: String,
    pub body: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub timestamp: i64,
}
