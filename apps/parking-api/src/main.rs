//! 智能停车后端：设备上报、看板接口与在线状态巡检任务。

mod handlers;
mod middleware;
mod routes;
mod utils;

#[cfg(test)]
mod tests;

use axum::Router;
use parking_auth::{AuthService, Authenticator, JwtManager};
use parking_config::AppConfig;
use parking_liveness::{LivenessPolicy, LivenessReconciler, spawn_liveness_loop};
use parking_registry::{ApiLogger, DeviceRegistry, ThresholdService};
use parking_storage::{
    AdminConfigStore, DeviceDirectory, InMemoryAdminConfigStore, InMemoryApiLogStore,
    InMemoryDeviceDirectory, InMemoryThresholdStore, InMemoryUserStore, RedisDeviceDirectory,
    RedisThresholdStore, RedisUserStore, StorageError, ThresholdStore, UserStore,
};
use parking_telemetry::init_tracing;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 请求处理共享状态。
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<DeviceRegistry>,
    pub thresholds: Arc<ThresholdService>,
    pub api_log: Arc<ApiLogger>,
    pub auth: Arc<dyn Authenticator>,
    pub reconciler: Arc<LivenessReconciler>,
    pub kill_switch: bool,
}

struct Backends {
    directory: Arc<dyn DeviceDirectory>,
    thresholds: Arc<dyn ThresholdStore>,
    users: Arc<dyn UserStore>,
    admin: Arc<dyn AdminConfigStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    let state = build_state(&config)?;
    let liveness = spawn_liveness_loop(
        state.reconciler.clone(),
        Duration::from_secs(config.liveness_interval_seconds),
        config.kill_switch,
    );

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(
        target: "parking.api",
        event = "http_listening",
        addr = %config.http_addr,
        kill_switch = config.kill_switch
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    liveness.abort();
    info!(target: "parking.api", event = "shutdown");
    Ok(())
}

/// 路由 + 追踪层 + 请求上下文
pub fn build_app(state: AppState) -> Router {
    routes::create_api_router(state)
        .layer(TraceLayer::new_for_http())
        // 注入 request_id/trace_id
        .layer(axum::middleware::from_fn(middleware::request_context))
}

async fn shutdown_signal() {
    // 信号注册失败时不触发退出
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// 按配置装配存储后端与各服务。
pub fn build_state(config: &AppConfig) -> Result<AppState, StorageError> {
    let backends = match &config.redis_url {
        Some(url) => {
            let users = Arc::new(RedisUserStore::connect(url, &config.redis_prefix)?);
            info!(
                target: "parking.api",
                event = "storage_backend_selected",
                backend = "redis",
                prefix = %config.redis_prefix
            );
            Backends {
                directory: Arc::new(RedisDeviceDirectory::connect(url, &config.redis_prefix)?),
                thresholds: Arc::new(RedisThresholdStore::connect(url, &config.redis_prefix)?),
                users: users.clone(),
                admin: users,
            }
        }
        None => {
            info!(
                target: "parking.api",
                event = "storage_backend_selected",
                backend = "in_memory"
            );
            Backends {
                directory: Arc::new(InMemoryDeviceDirectory::new()),
                thresholds: Arc::new(InMemoryThresholdStore::new()),
                users: Arc::new(InMemoryUserStore::new()),
                admin: Arc::new(InMemoryAdminConfigStore::new()),
            }
        }
    };

    let thresholds = Arc::new(ThresholdService::new(backends.thresholds));
    let registry = Arc::new(DeviceRegistry::new(
        backends.directory.clone(),
        thresholds.clone(),
    ));
    let policy = LivenessPolicy::new(config.heartbeat_timeout_ms, config.discovery_timeout_ms);
    let reconciler = Arc::new(LivenessReconciler::new(backends.directory, policy));
    let api_log = Arc::new(ApiLogger::new(Arc::new(InMemoryApiLogStore::with_capacity(
        config.api_log_capacity,
    ))));
    let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_session_ttl_seconds);
    let auth: Arc<dyn Authenticator> =
        Arc::new(AuthService::new(backends.users, backends.admin, jwt));

    Ok(AppState {
        registry,
        thresholds,
        api_log,
        auth,
        reconciler,
        kill_switch: config.kill_switch,
    })
}
