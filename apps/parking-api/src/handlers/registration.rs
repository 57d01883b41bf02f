//! 设备登记与映射 handlers
//!
//! - POST /api/parking/register/{macAddress} - 按 MAC 登记（固件调用）
//! - POST /api/parking/init/{deviceId} - 初始化设备记录（固件调用）
//! - GET /api/parking/mappings - 映射列表与下一个可用 ID
//! - POST /api/parking/mappings/manage - 手动建立映射（需认证）
//! - DELETE /api/parking/mappings/manage?macAddress= - 软删除映射（需认证）

use crate::AppState;
use crate::middleware::require_session;
use crate::utils::response::{bad_request_error, mapping_to_dto, registry_error};
use crate::utils::{decode_body, parse_device_id, parse_mac_address, record_api_call};
use api_contract::{
    ApiResponse, DeviceMappingDto, InitDeviceResponse, MappingListResponse, MappingQuery,
    MappingRemovedResponse, MappingRequest, RegistrationResponse,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use domain::{DeviceId, now_epoch_ms};
use serde_json::{Value, json};

/// 按 MAC 登记设备
///
/// 已登记的 MAC 返回原 ID（200），新 MAC 分配 `max + 1`（201）。
pub async fn register_device(
    State(state): State<AppState>,
    Path(raw_mac): Path<String>,
    uri: Uri,
) -> Response {
    let mac_address = match parse_mac_address(&raw_mac) {
        Ok(mac) => mac,
        Err(response) => return response,
    };

    let outcome = state
        .registry
        .register_by_mac(&mac_address, now_epoch_ms())
        .await;
    let error = outcome.as_ref().err().map(ToString::to_string);
    let device_label = outcome
        .as_ref()
        .map(|registration| registration.device_id.to_string())
        .unwrap_or_default();
    let body = json!({ "macAddress": mac_address });
    record_api_call(&state, &device_label, uri.path(), "POST", &body, error).await;

    match outcome {
        Ok(registration) => {
            let status = if registration.is_new_device {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(ApiResponse::success(RegistrationResponse {
                    device_id: registration.device_id,
                    mac_address,
                    is_new_device: registration.is_new_device,
                })),
            )
                .into_response()
        }
        Err(err) => registry_error(err),
    }
}

/// 初始化设备记录
///
/// 已存在返回原数据（200），否则写入默认字段（201）。
pub async fn init_device(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    uri: Uri,
) -> Response {
    let device_id = match parse_device_id(&raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let outcome = state.registry.init_device(device_id, now_epoch_ms()).await;
    let error = outcome.as_ref().err().map(ToString::to_string);
    record_api_call(&state, &raw_id, uri.path(), "POST", &Value::Null, error).await;

    match outcome {
        Ok(init) => {
            let status = if init.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(ApiResponse::success(InitDeviceResponse {
                    device_id: device_id.to_string(),
                    created: init.created,
                    data: init.data,
                })),
            )
                .into_response()
        }
        Err(err) => registry_error(err),
    }
}

/// 列出设备映射
pub async fn list_mappings(State(state): State<AppState>) -> Response {
    match state.registry.list_mappings().await {
        Ok(list) => (
            StatusCode::OK,
            Json(ApiResponse::success(MappingListResponse {
                mappings: list.mappings.into_iter().map(mapping_to_dto).collect(),
                next_id: list.next_id,
            })),
        )
            .into_response(),
        Err(err) => registry_error(err),
    }
}

/// 手动建立映射
///
/// MAC 已登记或 ID 已占用时返回 409。
pub async fn create_mapping(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    let ctx = match require_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    let req: MappingRequest = match decode_body(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let (Some(raw_mac), Some(raw_id)) = (req.mac_address, req.device_id) else {
        return bad_request_error("Missing required fields: macAddress or deviceId");
    };
    let mac_address = match parse_mac_address(&raw_mac) {
        Ok(mac) => mac,
        Err(response) => return response,
    };
    let device_id = match parse_device_id(&raw_id.as_text()) {
        Ok(DeviceId::Slot(id)) => id,
        _ => return bad_request_error("Device ID must be a positive number"),
    };

    let now = now_epoch_ms();
    let outcome = state
        .registry
        .create_mapping(&mac_address, device_id, now)
        .await;
    let error = outcome.as_ref().err().map(ToString::to_string);
    record_api_call(
        &state,
        &device_id.to_string(),
        uri.path(),
        "POST",
        &body,
        error,
    )
    .await;

    match outcome {
        Ok(()) => {
            tracing::info!(
                target: "parking.api",
                event = "mapping_created_by_operator",
                username = %ctx.username,
                device_id
            );
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(DeviceMappingDto {
                    mac_address,
                    device_id,
                    registered_at: Some(now),
                })),
            )
                .into_response()
        }
        Err(err) => registry_error(err),
    }
}

/// 软删除映射
pub async fn remove_mapping(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MappingQuery>,
) -> Response {
    let ctx = match require_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };
    let Some(raw_mac) = query.mac_address else {
        return bad_request_error("Missing required field: macAddress");
    };
    let mac_address = match parse_mac_address(&raw_mac) {
        Ok(mac) => mac,
        Err(response) => return response,
    };

    match state.registry.remove_mapping(&mac_address).await {
        Ok(device_id) => {
            tracing::info!(
                target: "parking.api",
                event = "mapping_removed_by_operator",
                username = %ctx.username,
                device_id
            );
            (
                StatusCode::OK,
                Json(ApiResponse::success(MappingRemovedResponse {
                    mac_address,
                    device_id,
                })),
            )
                .into_response()
        }
        Err(err) => registry_error(err),
    }
}
