//! 巡检计划：由目录快照与当前时间计算需要写回的字段。
//!
//! 纯函数，不访问存储；同一快照、同一时间总是得到同一组写入。

use crate::policy::LivenessPolicy;
use domain::{DeviceKey, DeviceRecord, SystemStatus, fields};
use parking_storage::{DirectorySnapshot, FieldWrites};
use serde_json::Value;

/// 单次巡检的统计结果。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// 参与计算的车位设备数（不含主机、已移除设备）
    pub devices_checked: usize,
    pub fields_written: usize,
    pub went_online: usize,
    pub went_offline: usize,
}

/// 巡检计划：待提交的字段写入与统计。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub writes: FieldWrites,
    pub report: PassReport,
}

impl ReconcilePlan {
    fn stage(&mut self, key: &DeviceKey, field: &str, value: impl Into<Value>) {
        self.writes.insert(key.field_path(field), value.into());
    }

    fn finish(mut self) -> Self {
        self.report.fields_written = self.writes.len();
        self
    }
}

fn heartbeat_fresh(now_ms: i64, ping_ms: i64, timeout_ms: u64) -> bool {
    now_ms.saturating_sub(ping_ms) <= i64::try_from(timeout_ms).unwrap_or(i64::MAX)
}

/// 主机在线：有心跳、心跳未超时，且 System Status 为 online 或缺省。
fn master_online(master: &DeviceRecord, now_ms: i64, policy: &LivenessPolicy) -> bool {
    let Some(ping) = master.last_health_ping else {
        return false;
    };
    heartbeat_fresh(now_ms, ping, policy.heartbeat_timeout_ms)
        && master.system_status != Some(SystemStatus::Offline)
}

/// 车位设备（主机在线时）的在线判定。
fn device_online(device: &DeviceRecord, now_ms: i64, policy: &LivenessPolicy) -> bool {
    if device.system_status == Some(SystemStatus::Offline) {
        return false;
    }
    match device.last_health_ping {
        Some(ping) => heartbeat_fresh(now_ms, ping, policy.heartbeat_timeout_ms),
        None => false,
    }
}

/// 遍历快照中的车位设备（跳过主机、保留键、非对象值和已移除设备）。
fn slot_devices(snapshot: &DirectorySnapshot) -> impl Iterator<Item = (DeviceKey, DeviceRecord)> + '_ {
    snapshot.iter().filter_map(|(raw_key, value)| {
        let key = DeviceKey::parse(raw_key)?;
        if key.id().is_master() {
            return None;
        }
        let record = DeviceRecord::from_value(value)?;
        if record.removed {
            return None;
        }
        Some((key, record))
    })
}

/// 计算在线状态巡检的写入计划。
pub fn plan_reconcile(
    snapshot: &DirectorySnapshot,
    now_ms: i64,
    policy: &LivenessPolicy,
) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    let master_key = DeviceKey::master();
    let master = snapshot
        .get(&master_key.to_string())
        .and_then(DeviceRecord::from_value);

    let is_master_online = match &master {
        Some(master) => {
            plan_master(&mut plan, &master_key, master, now_ms, policy);
            master_online(master, now_ms, policy)
        }
        None => false,
    };

    for (key, device) in slot_devices(snapshot) {
        plan.report.devices_checked += 1;
        plan_device(&mut plan, &key, &device, is_master_online, now_ms, policy);
    }
    plan.finish()
}

fn plan_master(
    plan: &mut ReconcilePlan,
    key: &DeviceKey,
    master: &DeviceRecord,
    now_ms: i64,
    policy: &LivenessPolicy,
) {
    // 发现模式超时（物理开关锁定时不超时）
    if master.discovery_mode == Some(true) && master.physical_override != Some(true) {
        let expired = match master.last_discovery_update {
            Some(updated) => {
                now_ms.saturating_sub(updated)
                    > i64::try_from(policy.discovery_timeout_ms).unwrap_or(i64::MAX)
            }
            None => true,
        };
        if expired {
            plan.stage(key, fields::DISCOVERY_MODE, false);
            plan.stage(key, fields::LAST_DISCOVERY_UPDATE, now_ms);
        }
    }

    let online = master_online(master, now_ms, policy);
    if master.is_online != Some(online) {
        stage_liveness(plan, key, master, online);
    }
}

fn plan_device(
    plan: &mut ReconcilePlan,
    key: &DeviceKey,
    device: &DeviceRecord,
    is_master_online: bool,
    now_ms: i64,
    policy: &LivenessPolicy,
) {
    let was_online = device.is_online == Some(true);
    let online = is_master_online && device_online(device, now_ms, policy);

    if !is_master_online {
        // 主机离线：所有车位强制离线，两个字段各自按需写入
        if device.is_online != Some(false) {
            plan.stage(key, fields::IS_ONLINE, false);
        }
        if device.system_status != Some(SystemStatus::Offline) {
            plan.stage(key, fields::SYSTEM_STATUS, SystemStatus::Offline.as_str());
        }
        if was_online {
            plan.report.went_offline += 1;
        }
    } else if device.is_online != Some(online) {
        stage_liveness(plan, key, device, online);
    }

    // 显式 offline 覆盖同样按在线转离线记录 lastSeen，不跳过
    if was_online && !online {
        let last_seen = device.last_health_ping.unwrap_or(now_ms);
        plan.stage(key, fields::LAST_SEEN, last_seen);
        plan.stage(key, fields::TIME_SINCE_UPDATE_MS, now_ms.saturating_sub(last_seen));
    } else if !online && device.last_seen.is_none() {
        // 首次登记：离线设备补记 lastSeen，不影响在线判定
        plan.stage(key, fields::LAST_SEEN, device.last_health_ping.unwrap_or(now_ms));
    }
}

/// 写入在线标记，并在需要时同步 System Status。
fn stage_liveness(plan: &mut ReconcilePlan, key: &DeviceKey, record: &DeviceRecord, online: bool) {
    plan.stage(key, fields::IS_ONLINE, online);
    let status = SystemStatus::from_online(online);
    if record.system_status != Some(status) {
        plan.stage(key, fields::SYSTEM_STATUS, status.as_str());
    }
    match (record.is_online == Some(true), online) {
        (false, true) => plan.report.went_online += 1,
        (true, false) => plan.report.went_offline += 1,
        _ => {}
    }
}

/// 计算离线计时刷新的写入计划。
pub fn plan_timer_refresh(snapshot: &DirectorySnapshot, now_ms: i64) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    for (key, device) in slot_devices(snapshot) {
        plan.report.devices_checked += 1;
        if device.is_online != Some(false) {
            continue;
        }
        let Some(last_seen) = device.last_seen else {
            continue;
        };
        let elapsed = now_ms.saturating_sub(last_seen);
        if device.time_since_update_ms != Some(elapsed) {
            plan.stage(&key, fields::TIME_SINCE_UPDATE_MS, elapsed);
        }
    }
    plan.finish()
}
