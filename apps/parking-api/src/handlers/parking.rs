//! 看板车位 handlers
//!
//! - GET /api/parking - 全量目录快照
//! - GET /api/parking/{deviceId} - 单个设备
//! - PUT /api/parking/{deviceId} - 手动修改设备字段（需认证）
//! - GET|POST /api/parking/status/update - 立即执行一次巡检

use crate::AppState;
use crate::middleware::require_session;
use crate::utils::parse_device_id;
use crate::utils::response::{liveness_error, registry_error};
use api_contract::{ApiResponse, DeviceUpdateRequest, DeviceUpdateResponse, StatusUpdateResponse};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use domain::now_epoch_ms;
use parking_registry::DeviceFieldsUpdate;
use serde_json::Value;
use tracing::info;

/// 全量目录快照（含 DeviceCount 等保留键）
pub async fn list_parking(State(state): State<AppState>) -> Response {
    match state.registry.snapshot().await {
        Ok(snapshot) => (StatusCode::OK, Json(ApiResponse::success(snapshot))).into_response(),
        Err(err) => registry_error(err),
    }
}

/// 读取单个设备记录
pub async fn get_parking_device(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    let device_id = match parse_device_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.registry.get_device(device_id).await {
        Ok(record) => (StatusCode::OK, Json(ApiResponse::success(record))).into_response(),
        Err(err) => registry_error(err),
    }
}

/// 手动修改设备字段
///
/// 至少提供一个字段；parkingStatus 只接受 open / occupied。
pub async fn update_parking_device(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<DeviceUpdateRequest>,
) -> Response {
    let ctx = match require_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    let device_id = match parse_device_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let update = match DeviceFieldsUpdate::parse(
        req.parking_status.as_deref(),
        req.sensor_error,
        req.system_status.as_deref(),
    ) {
        Ok(update) => update,
        Err(err) => return registry_error(err),
    };

    match state.registry.update_device(device_id, update).await {
        Ok(updated) => {
            info!(
                target: "parking.api",
                event = "device_updated_by_operator",
                username = %ctx.username,
                device = %device_id
            );
            (
                StatusCode::OK,
                Json(ApiResponse::success(DeviceUpdateResponse {
                    device_id: device_id.to_string(),
                    updated: Value::Object(updated),
                })),
            )
                .into_response()
        }
        Err(err) => registry_error(err),
    }
}

/// 立即执行一次巡检（主巡检 + 离线计时刷新）
pub async fn trigger_status_update(State(state): State<AppState>) -> Response {
    match state.reconciler.run_tick(now_epoch_ms()).await {
        Ok(tick) => (
            StatusCode::OK,
            Json(ApiResponse::success(StatusUpdateResponse {
                devices_checked: tick.reconcile.devices_checked,
                fields_written: tick.reconcile.fields_written,
                went_online: tick.reconcile.went_online,
                went_offline: tick.reconcile.went_offline,
                timers_refreshed: tick.timers.fields_written,
            })),
        )
            .into_response(),
        Err(err) => liveness_error(err),
    }
}
