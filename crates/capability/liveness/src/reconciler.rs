//! 巡检服务：读取目录快照、计算计划、一次性提交。

use crate::error::LivenessError;
use crate::plan::{PassReport, ReconcilePlan, plan_reconcile, plan_timer_refresh};
use crate::policy::LivenessPolicy;
use parking_storage::DeviceDirectory;
use parking_telemetry::{
    record_fields_written, record_reconcile_failure, record_reconcile_latency_ms,
    record_reconcile_pass, record_timer_refresh, record_transitions,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// 一个调度周期的结果（主巡检 + 离线计时刷新）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub reconcile: PassReport,
    pub timers: PassReport,
}

/// 在线状态巡检器。
pub struct LivenessReconciler {
    directory: Arc<dyn DeviceDirectory>,
    policy: LivenessPolicy,
}

impl LivenessReconciler {
    pub fn new(directory: Arc<dyn DeviceDirectory>, policy: LivenessPolicy) -> Self {
        Self { directory, policy }
    }

    pub fn policy(&self) -> &LivenessPolicy {
        &self.policy
    }

    /// 主巡检：重算在线状态、主机依赖与发现模式超时。
    pub async fn reconcile(&self, now_ms: i64) -> Result<PassReport, LivenessError> {
        let started = Instant::now();
        let result = self
            .run_pass(|snapshot| plan_reconcile(snapshot, now_ms, &self.policy))
            .await;
        record_reconcile_latency_ms(started.elapsed().as_millis() as u64);
        match &result {
            Ok(report) => {
                record_reconcile_pass();
                record_fields_written(report.fields_written as u64);
                record_transitions(report.went_online as u64, report.went_offline as u64);
                if report.fields_written > 0 {
                    info!(
                        target: "parking.liveness",
                        event = "reconcile_committed",
                        devices = report.devices_checked,
                        fields = report.fields_written,
                        went_online = report.went_online,
                        went_offline = report.went_offline
                    );
                }
            }
            Err(err) => {
                record_reconcile_failure();
                warn!(target: "parking.liveness", event = "reconcile_failed", error = %err);
            }
        }
        result
    }

    /// 离线计时刷新：为离线设备重算 timeSinceUpdateMs。
    pub async fn refresh_offline_timers(&self, now_ms: i64) -> Result<PassReport, LivenessError> {
        let result = self
            .run_pass(|snapshot| plan_timer_refresh(snapshot, now_ms))
            .await;
        match &result {
            Ok(report) => {
                record_timer_refresh();
                record_fields_written(report.fields_written as u64);
            }
            Err(err) => {
                warn!(target: "parking.liveness", event = "timer_refresh_failed", error = %err);
            }
        }
        result
    }

    /// 一个调度周期：主巡检后立即刷新离线计时（刷新会重新读取目录）。
    ///
    /// 主巡检失败时仍执行刷新，返回主巡检的错误。
    pub async fn run_tick(&self, now_ms: i64) -> Result<TickReport, LivenessError> {
        let reconcile = self.reconcile(now_ms).await;
        let timers = self.refresh_offline_timers(now_ms).await;
        Ok(TickReport {
            reconcile: reconcile?,
            timers: timers?,
        })
    }

    async fn run_pass<F>(&self, plan: F) -> Result<PassReport, LivenessError>
    where
        F: FnOnce(&parking_storage::DirectorySnapshot) -> ReconcilePlan,
    {
        let snapshot = self.directory.get_all().await.map_err(LivenessError::Read)?;
        let ReconcilePlan { writes, report } = plan(&snapshot);
        if !writes.is_empty() {
            self.directory
                .update(writes)
                .await
                .map_err(LivenessError::Write)?;
        }
        Ok(report)
    }
}
