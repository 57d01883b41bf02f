//! 路由定义
//!
//! - 存活检查：/health
//! - 设备上报与看板：/api/parking/*（受紧急停止开关控制）
//! - 账号：/api/auth/*
//! - 运维：/api/logs, /api/kill-switch, /api/metrics

use super::AppState;
use super::handlers::*;
use crate::middleware::kill_switch_guard;
use axum::{
    Router,
    middleware,
    routing::{get, post},
};

/// 创建 API 路由
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .merge(parking_router(state.clone()))
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh-session", post(refresh_session))
        .route("/api/auth/checkAdminConfig", get(check_admin_config))
        .route("/api/auth/setAdminPassword", post(set_admin_password))
        .route("/api/logs", get(list_logs))
        .route("/api/kill-switch", get(kill_switch_status))
        .route("/api/metrics", get(get_metrics))
        .with_state(state)
}

/// `/api/parking/*`：静态段优先于 `:device_id`
fn parking_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/parking", get(list_parking))
        .route("/api/parking/health", post(health_ping))
        .route("/api/parking/sensor/:device_id", post(sensor_update))
        .route("/api/parking/register/:mac_address", post(register_device))
        .route("/api/parking/init/:device_id", post(init_device))
        .route("/api/parking/mappings", get(list_mappings))
        .route(
            "/api/parking/mappings/manage",
            post(create_mapping).delete(remove_mapping),
        )
        .route(
            "/api/parking/config/threshold",
            get(list_thresholds).post(set_threshold),
        )
        .route(
            "/api/parking/config/threshold/:device_id",
            get(get_device_threshold),
        )
        .route(
            "/api/parking/status/update",
            get(trigger_status_update).post(trigger_status_update),
        )
        .route(
            "/api/parking/:device_id",
            get(get_parking_device).put(update_parking_device),
        )
        .route_layer(middleware::from_fn_with_state(state, kill_switch_guard))
}
