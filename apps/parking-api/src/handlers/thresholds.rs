//! 阈值配置 handlers
//!
//! - GET /api/parking/config/threshold - 全部阈值（缺省时写入默认 45 cm）
//! - POST /api/parking/config/threshold - 设置默认或设备阈值（需认证）
//! - GET /api/parking/config/threshold/{deviceId} - 设备生效阈值（固件调用）

use crate::AppState;
use crate::middleware::require_session;
use crate::utils::response::{bad_request_error, registry_error, threshold_to_dto};
use crate::utils::{decode_body, parse_device_id, record_api_call};
use api_contract::{
    ApiResponse, DeviceThresholdResponse, ThresholdRequest, ThresholdTableResponse,
    ThresholdUpdateResponse,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use domain::now_epoch_ms;
use parking_storage::DEFAULT_THRESHOLD_KEY;
use serde_json::Value;

/// 列出全部阈值
pub async fn list_thresholds(State(state): State<AppState>) -> Response {
    match state.thresholds.list(now_epoch_ms()).await {
        Ok(table) => (
            StatusCode::OK,
            Json(ApiResponse::success(ThresholdTableResponse {
                thresholds: table
                    .entries
                    .into_iter()
                    .map(|(key, record)| (key, threshold_to_dto(record)))
                    .collect(),
                update_required: table.update_required,
            })),
        )
            .into_response(),
        Err(err) => registry_error(err),
    }
}

/// 设置阈值
///
/// 不带 deviceId 时修改默认阈值，并置位 updateRequired。
pub async fn set_threshold(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = require_session(&state, &headers) {
        return response;
    }
    let req: ThresholdRequest = match decode_body(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let Some(value) = req.value else {
        return bad_request_error("Missing or invalid threshold value");
    };
    let device_id = match req.device_id.map(|id| id.as_text()) {
        Some(raw) => match parse_device_id(&raw) {
            Ok(id) => Some(id),
            Err(_) => return bad_request_error("Invalid device ID format"),
        },
        None => None,
    };
    let key = match device_id {
        Some(id) => id.key().to_string(),
        None => DEFAULT_THRESHOLD_KEY.to_string(),
    };

    let outcome = state.thresholds.set(value, device_id, now_epoch_ms()).await;
    let error = outcome.as_ref().err().map(ToString::to_string);
    record_api_call(&state, &key, uri.path(), "POST", &body, error).await;

    match outcome {
        Ok(record) => (
            StatusCode::OK,
            Json(ApiResponse::success(ThresholdUpdateResponse {
                key,
                value: record.value,
                updated_at: record.updated_at,
            })),
        )
            .into_response(),
        Err(err) => registry_error(err),
    }
}

/// 设备生效阈值：设备阈值 -> 默认阈值 -> 兜底值
pub async fn get_device_threshold(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    let device_id = match parse_device_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.thresholds.resolve(device_id).await {
        Ok(resolved) => (
            StatusCode::OK,
            Json(ApiResponse::success(DeviceThresholdResponse {
                device_id: device_id.to_string(),
                threshold: resolved.value,
                updated_at: resolved.updated_at,
                source: resolved.source.as_str().to_string(),
            })),
        )
            .into_response(),
        Err(err) => registry_error(err),
    }
}
