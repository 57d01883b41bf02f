//! HTTP 响应辅助函数和 DTO 转换
//!
//! 所有错误返回统一的 ApiResponse 格式，HTTP 状态码与错误码对应：
//! - 400 INVALID.REQUEST
//! - 401 AUTH.UNAUTHORIZED / 403 AUTH.FORBIDDEN
//! - 404 RESOURCE.NOT_FOUND / 409 RESOURCE.CONFLICT
//! - 503 SERVICE.KILL_SWITCH
//! - 500 INTERNAL.ERROR

use api_contract::{
    ApiError, ApiLogDto, ApiResponse, DeviceMappingDto, KillSwitchRejection, ThresholdDto,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parking_auth::AuthError;
use parking_liveness::LivenessError;
use parking_registry::{DeviceMapping, RegistryError};
use parking_storage::{ApiLogRecord, StorageError, ThresholdRecord};

/// 认证错误响应
pub fn auth_error(status: StatusCode) -> Response {
    (
        status,
        Json(ApiResponse::<()>::error(
            "AUTH.UNAUTHORIZED",
            "unauthorized",
        )),
    )
        .into_response()
}

/// 禁止访问错误响应
pub fn forbidden_error(message: impl Into<String>) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<()>::error("AUTH.FORBIDDEN", message.into())),
    )
        .into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error(message: impl Into<String>) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", message.into())),
    )
        .into_response()
}

/// 资源冲突错误响应
pub fn conflict_error(message: impl Into<String>) -> Response {
    (
        StatusCode::CONFLICT,
        Json(ApiResponse::<()>::error("RESOURCE.CONFLICT", message.into())),
    )
        .into_response()
}

/// 紧急停止响应（data 中带 killSwitchEnabled）
pub fn kill_switch_error() -> Response {
    let body = ApiResponse {
        success: false,
        data: Some(KillSwitchRejection {
            kill_switch_enabled: true,
        }),
        error: Some(ApiError {
            code: "SERVICE.KILL_SWITCH".to_string(),
            message: "Service temporarily disabled by kill switch".to_string(),
        }),
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}

/// 认证错误映射
pub fn internal_auth_error(err: AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::TokenInvalid => {
            auth_error(StatusCode::UNAUTHORIZED)
        }
        AuthError::AdminPasswordInvalid => forbidden_error(err.to_string()),
        AuthError::UsernameTaken => conflict_error(err.to_string()),
        AuthError::InvalidInput(message) => bad_request_error(message),
        AuthError::Internal(_) => internal_error(err.to_string()),
    }
}

/// 存储错误响应
pub fn storage_error(err: StorageError) -> Response {
    internal_error(err.to_string())
}

/// 登记服务错误映射
pub fn registry_error(err: RegistryError) -> Response {
    match err {
        RegistryError::Invalid(message) => bad_request_error(message),
        RegistryError::Conflict(message) => conflict_error(message),
        RegistryError::NotFound(message) => not_found_error(message),
        RegistryError::Storage(err) => storage_error(err),
    }
}

/// 巡检错误响应
pub fn liveness_error(err: LivenessError) -> Response {
    internal_error(err.to_string())
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// DeviceMapping 转 DeviceMappingDto
pub fn mapping_to_dto(mapping: DeviceMapping) -> DeviceMappingDto {
    DeviceMappingDto {
        mac_address: mapping.mac_address,
        device_id: mapping.device_id,
        registered_at: mapping.registered_at,
    }
}

/// ThresholdRecord 转 ThresholdDto
pub fn threshold_to_dto(record: ThresholdRecord) -> ThresholdDto {
    ThresholdDto {
        value: record.value,
        updated_at: record.updated_at,
    }
}

/// ApiLogRecord 转 ApiLogDto
pub fn api_log_to_dto(record: ApiLogRecord) -> ApiLogDto {
    ApiLogDto {
        id: record.id,
        device_id: record.device_id,
        endpoint: record.endpoint,
        method: record.method,
        body: record.body,
        success: record.success,
        error_message: record.error_message,
        timestamp: record.timestamp,
    }
}
