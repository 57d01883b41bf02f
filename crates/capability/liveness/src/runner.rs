//! 后台巡检任务。

use crate::reconciler::LivenessReconciler;
use domain::now_epoch_ms;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

/// 启动周期巡检任务。
///
/// 每个周期顺序执行主巡检与离线计时刷新，周期之间不重叠；
/// 失败只记录日志，下一周期从头重试。紧急开关打开时跳过所有周期。
pub fn spawn_liveness_loop(
    reconciler: Arc<LivenessReconciler>,
    period: Duration,
    kill_switch: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            target: "parking.liveness",
            event = "liveness_loop_started",
            period_ms = period.as_millis() as u64,
            kill_switch
        );
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if kill_switch {
                debug!(target: "parking.liveness", event = "tick_skipped_kill_switch");
                continue;
            }
            // 错误已在巡检器内部记录
            let _ = reconciler.run_tick(now_epoch_ms()).await;
        }
    })
}
