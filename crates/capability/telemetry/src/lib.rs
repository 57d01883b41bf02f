//! 追踪、请求 ID 生成与进程内指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
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

/// 进程内指标。
pub struct TelemetryMetrics {
    reconcile_passes: AtomicU64,
    reconcile_failures: AtomicU64,
    reconcile_latency_ms_total: AtomicU64,
    reconcile_latency_ms_count: AtomicU64,
    fields_written: AtomicU64,
    devices_went_online: AtomicU64,
    devices_went_offline: AtomicU64,
    timer_refreshes: AtomicU64,
    health_pings: AtomicU64,
    sensor_updates: AtomicU64,
    registrations: AtomicU64,
    kill_switch_rejections: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            reconcile_passes: AtomicU64::new(0),
            reconcile_failures: AtomicU64::new(0),
            reconcile_latency_ms_total: AtomicU64::new(0),
            reconcile_latency_ms_count: AtomicU64::new(0),
            fields_written: AtomicU64::new(0),
            devices_went_online: AtomicU64::new(0),
            devices_went_offline: AtomicU64::new(0),
            timer_refreshes: AtomicU64::new(0),
            health_pings: AtomicU64::new(0),
            sensor_updates: AtomicU64::new(0),
            registrations: AtomicU64::new(0),
            kill_switch_rejections: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reconcile_passes: self.reconcile_passes.load(Ordering::Relaxed),
            reconcile_failures: self.reconcile_failures.load(Ordering::Relaxed),
            reconcile_latency_ms_total: self.reconcile_latency_ms_total.load(Ordering::Relaxed),
            reconcile_latency_ms_count: self.reconcile_latency_ms_count.load(Ordering::Relaxed),
            fields_written: self.fields_written.load(Ordering::Relaxed),
            devices_went_online: self.devices_went_online.load(Ordering::Relaxed),
            devices_went_offline: self.devices_went_offline.load(Ordering::Relaxed),
            timer_refreshes: self.timer_refreshes.load(Ordering::Relaxed),
            health_pings: self.health_pings.load(Ordering::Relaxed),
            sensor_updates: self.sensor_updates.load(Ordering::Relaxed),
            registrations: self.registrations.load(Ordering::Relaxed),
            kill_switch_rejections: self.kill_switch_rejections.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录一次成功的在线状态巡检。
pub fn record_reconcile_pass() {
    metrics().reconcile_passes.fetch_add(1, Ordering::Relaxed);
}

/// 记录巡检失败次数（读取或提交失败）。
pub fn record_reconcile_failure() {
    metrics().reconcile_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录巡检耗时（毫秒，包含读取快照与批量提交）。
pub fn record_reconcile_latency_ms(latency_ms: u64) {
    let metrics = metrics();
    metrics
        .reconcile_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .reconcile_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录巡检写入的字段数。
pub fn record_fields_written(count: u64) {
    metrics().fields_written.fetch_add(count, Ordering::Relaxed);
}

/// 记录上线 / 下线的设备数。
pub fn record_transitions(went_online: u64, went_offline: u64) {
    let metrics = metrics();
    metrics
        .devices_went_online
        .fetch_add(went_online, Ordering::Relaxed);
    metrics
        .devices_went_offline
        .fetch_add(went_offline, Ordering::Relaxed);
}

/// 记录离线计时刷新次数。
pub fn record_timer_refresh() {
    metrics().timer_refreshes.fetch_add(1, Ordering::Relaxed);
}

/// 记录心跳上报次数。
pub fn record_health_ping() {
    metrics().health_pings.fetch_add(1, Ordering::Relaxed);
}

/// 记录传感器上报次数。
pub fn record_sensor_update() {
    metrics().sensor_updates.fetch_add(1, Ordering::Relaxed);
}

/// 记录新设备注册次数。
pub fn record_registration() {
    metrics().registrations.fetch_add(1, Ordering::Relaxed);
}

/// 记录因紧急开关被拒绝的请求数。
pub fn record_kill_switch_rejection() {
    metrics()
        .kill_switch_rejections
        .fetch_add(1, Ordering::Relaxed);
}
