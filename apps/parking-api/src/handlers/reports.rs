//! 设备上报 handlers（固件调用，无需认证）
//!
//! - POST /api/parking/health - 心跳
//! - POST /api/parking/sensor/{deviceId} - 传感器读数
//!
//! 在线标记不在这里写入，由巡检统一计算。

use crate::AppState;
use crate::utils::response::{bad_request_error, registry_error};
use crate::utils::{decode_body, parse_device_id, record_api_call};
use api_contract::{ApiResponse, HealthPingRequest, HealthPingResponse, SensorUpdateRequest};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use domain::{SystemStatus, now_epoch_ms};
use parking_registry::{HealthPing, SensorReading};
use serde_json::Value;

/// 记录心跳
///
/// `systemStatus` 缺省为 online；主机心跳可附带发现模式与物理开关状态。
pub async fn health_ping(State(state): State<AppState>, uri: Uri, Json(body): Json<Value>) -> Response {
    let req: HealthPingRequest = match decode_body(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let Some(raw_id) = req.device_id.map(|id| id.as_text()) else {
        return bad_request_error("Device ID is required");
    };
    let device_id = match parse_device_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let system_status = match req.system_status.as_deref() {
        Some(raw) => match SystemStatus::parse(raw) {
            Some(status) => Some(status),
            None => return bad_request_error("systemStatus must be \"online\" or \"offline\""),
        },
        None => None,
    };

    let now = now_epoch_ms();
    let ping = HealthPing {
        system_status,
        discovery_mode: req.discovery_mode,
        physical_override: req.physical_override,
    };
    let outcome = state.registry.record_health_ping(device_id, ping, now).await;
    let error = outcome.as_ref().err().map(ToString::to_string);
    record_api_call(&state, &raw_id, uri.path(), "POST", &body, error).await;

    match outcome {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::success(HealthPingResponse {
                device_id: device_id.to_string(),
                timestamp: now,
            })),
        )
            .into_response(),
        Err(err) => registry_error(err),
    }
}

/// 应用传感器读数
///
/// 传感器故障优先：`hasSensorError=true` 时车位状态为 unknown；
/// 否则按阈值把距离换算为 occupied / open。
pub async fn sensor_update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    let device_id = match parse_device_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let req: SensorUpdateRequest = match decode_body(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let reading = SensorReading {
        distance_cm: req.distance,
        has_sensor_error: req.has_sensor_error,
    };
    let outcome = state.registry.apply_sensor_reading(device_id, reading).await;
    let error = outcome.as_ref().err().map(ToString::to_string);
    record_api_call(&state, &raw_id, uri.path(), "POST", &body, error).await;

    match outcome {
        Ok(written) => (StatusCode::OK, Json(ApiResponse::success(written))).into_response(),
        Err(err) => registry_error(err),
    }
}
