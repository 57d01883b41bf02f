//! 运维 handlers
//!
//! - GET /health - 进程存活
//! - GET /api/logs?limit= - 最近的 API 请求日志（新的在前）
//! - GET /api/kill-switch - 紧急停止状态
//! - GET /api/metrics - 进程内指标快照

use crate::AppState;
use crate::utils::response::{api_log_to_dto, storage_error};
use api_contract::{ApiLogDto, ApiResponse, KillSwitchResponse, LogQuery, MetricsSnapshotDto};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parking_storage::DEFAULT_API_LOG_CAPACITY;
use parking_telemetry::metrics;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

pub async fn list_logs(State(state): State<AppState>, Query(query): Query<LogQuery>) -> Response {
    let limit = query.limit.unwrap_or(DEFAULT_API_LOG_CAPACITY);
    match state.api_log.recent(limit).await {
        Ok(records) => {
            let data: Vec<ApiLogDto> = records.into_iter().map(api_log_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

pub async fn kill_switch_status(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::success(KillSwitchResponse {
            enabled: state.kill_switch,
        })),
    )
        .into_response()
}

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            reconcile_passes: snapshot.reconcile_passes,
            reconcile_failures: snapshot.reconcile_failures,
            reconcile_latency_ms_total: snapshot.reconcile_latency_ms_total,
            reconcile_latency_ms_count: snapshot.reconcile_latency_ms_count,
            fields_written: snapshot.fields_written,
            devices_went_online: snapshot.devices_went_online,
            devices_went_offline: snapshot.devices_went_offline,
            timer_refreshes: snapshot.timer_refreshes,
            health_pings: snapshot.health_pings,
            sensor_updates: snapshot.sensor_updates,
            registrations: snapshot.registrations,
            kill_switch_rejections: snapshot.kill_switch_rejections,
        })),
    )
        .into_response()
}
