//! 设备在线状态巡检。
//!
//! 周期性读取整个设备目录，根据心跳时间、System Status 与主机依赖
//! 重算每台设备的 `isOnline`，并处理主机发现模式超时。
//! 只写回真正变化的字段，且一次巡检只提交一次批量写入。
//!
//! 判定规则：
//! - 主机离线（或不存在）时，所有车位设备强制离线
//! - System Status 显式为 offline 时，设备离线
//! - 否则距最近心跳不超过心跳超时即在线
//! - 由在线转为离线时记录 `lastSeen` 与 `timeSinceUpdateMs`

mod error;
mod plan;
mod policy;
mod reconciler;
mod runner;

pub use error::LivenessError;
pub use plan::{PassReport, ReconcilePlan, plan_reconcile, plan_timer_refresh};
pub use policy::{DEFAULT_DISCOVERY_TIMEOUT_MS, DEFAULT_HEARTBEAT_TIMEOUT_MS, LivenessPolicy};
pub use reconciler::{LivenessReconciler, TickReport};
pub use runner::spawn_liveness_loop;
