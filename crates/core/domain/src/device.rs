//! 设备标识与设备记录。
//!
//! 设备目录中的记录以 `"Device" + id` 为键，`id` 为 `master` 或正整数。
//! 记录内容是宽松解析的：无法识别的字段值一律视为缺省，
//! 这样一条损坏的记录只会被当作离线/未见，而不会让整轮巡检失败。

use crate::fields;
use serde_json::{Map, Value};
use std::fmt;

const DEVICE_KEY_PREFIX: &str = "Device";
const MASTER_ID: &str = "master";

/// 设备 ID：主机或编号车位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceId {
    Master,
    Slot(u32),
}

impl DeviceId {
    /// 解析设备 ID（`master` 或正整数）。
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw == MASTER_ID {
            return Some(Self::Master);
        }
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match raw.parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(id) => Some(Self::Slot(id)),
        }
    }

    pub fn is_master(&self) -> bool {
        matches!(self, Self::Master)
    }

    /// 对应的目录键。
    pub fn key(&self) -> DeviceKey {
        DeviceKey(*self)
    }

    pub fn slot(&self) -> Option<u32> {
        match self {
            Self::Master => None,
            Self::Slot(id) => Some(*id),
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => f.write_str(MASTER_ID),
            Self::Slot(id) => write!(f, "{id}"),
        }
    }
}

/// 设备目录键（`Devicemaster`、`Device1` ...）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceKey(DeviceId);

impl DeviceKey {
    /// 从目录键解析；`DeviceCount` 等非设备键返回 None。
    ///
    /// 只接受规范写法，`Device01`、`Device 1` 这类键不视为设备，
    /// 否则写入会落到另一个键上。
    pub fn parse(raw: &str) -> Option<Self> {
        let id = raw.strip_prefix(DEVICE_KEY_PREFIX)?;
        let key = DeviceId::parse(id).map(Self)?;
        (key.to_string() == raw).then_some(key)
    }

    pub fn master() -> Self {
        Self(DeviceId::Master)
    }

    pub fn id(&self) -> DeviceId {
        self.0
    }

    /// 字段路径：`<deviceKey>/<fieldName>`。
    pub fn field_path(&self, field: &str) -> String {
        format!("{self}/{field}")
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DEVICE_KEY_PREFIX}{}", self.0)
    }
}

/// 车位占用状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkingStatus {
    Open,
    Occupied,
    Unknown,
}

impl ParkingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Occupied => "occupied",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "open" => Some(Self::Open),
            "occupied" => Some(Self::Occupied),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// System Status 字段：存在时即为权威判定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    Online,
    Offline,
}

impl SystemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "online" => Some(Self::Online),
            "offline" => Some(Self::Offline),
            _ => None,
        }
    }

    /// 由在线判定结果映射出的 System Status。
    pub fn from_online(online: bool) -> Self {
        if online { Self::Online } else { Self::Offline }
    }
}

/// 设备记录（目录中 JSON 对象的类型化视图）。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceRecord {
    pub mac_address: Option<String>,
    pub parking_status: Option<ParkingStatus>,
    pub sensor_error: Option<bool>,
    pub system_status: Option<SystemStatus>,
    pub last_health_ping: Option<i64>,
    pub last_seen: Option<i64>,
    pub is_online: Option<bool>,
    pub time_since_update_ms: Option<i64>,
    pub discovery_mode: Option<bool>,
    pub last_discovery_update: Option<i64>,
    pub physical_override: Option<bool>,
    pub removed: bool,
    pub registered_at: Option<i64>,
}

impl DeviceRecord {
    /// 新登记设备的默认记录。
    pub fn registered(system_status: SystemStatus, mac_address: Option<String>, now_ms: i64) -> Self {
        Self {
            parking_status: Some(ParkingStatus::Open),
            sensor_error: Some(false),
            system_status: Some(system_status),
            registered_at: mac_address.as_ref().map(|_| now_ms),
            mac_address,
            ..Self::default()
        }
    }

    /// 从目录中的 JSON 值解析；非对象返回 None。
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            mac_address: map
                .get(fields::MAC_ADDRESS)
                .and_then(Value::as_str)
                .filter(|mac| !mac.is_empty())
                .map(str::to_string),
            parking_status: map
                .get(fields::PARKING_STATUS)
                .and_then(Value::as_str)
                .and_then(ParkingStatus::parse),
            sensor_error: map.get(fields::SENSOR_ERROR).and_then(Value::as_bool),
            system_status: map
                .get(fields::SYSTEM_STATUS)
                .and_then(Value::as_str)
                .and_then(SystemStatus::parse),
            last_health_ping: map.get(fields::LAST_HEALTH_PING).and_then(timestamp_ms),
            last_seen: map.get(fields::LAST_SEEN).and_then(timestamp_ms),
            is_online: map.get(fields::IS_ONLINE).and_then(Value::as_bool),
            time_since_update_ms: map.get(fields::TIME_SINCE_UPDATE_MS).and_then(timestamp_ms),
            discovery_mode: map.get(fields::DISCOVERY_MODE).and_then(Value::as_bool),
            last_discovery_update: map.get(fields::LAST_DISCOVERY_UPDATE).and_then(timestamp_ms),
            physical_override: map.get(fields::PHYSICAL_OVERRIDE).and_then(Value::as_bool),
            removed: map
                .get(fields::REMOVED)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            registered_at: map.get(fields::REGISTERED_AT).and_then(timestamp_ms),
        })
    }

    /// 转为目录中的 JSON 对象，仅包含已设置的字段。
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(status) = self.parking_status {
            map.insert(fields::PARKING_STATUS.into(), status.as_str().into());
        }
        if let Some(error) = self.sensor_error {
            map.insert(fields::SENSOR_ERROR.into(), error.into());
        }
        if let Some(status) = self.system_status {
            map.insert(fields::SYSTEM_STATUS.into(), status.as_str().into());
        }
        if let Some(mac) = &self.mac_address {
            map.insert(fields::MAC_ADDRESS.into(), mac.clone().into());
        }
        if let Some(ts) = self.last_health_ping {
            map.insert(fields::LAST_HEALTH_PING.into(), ts.into());
        }
        if let Some(ts) = self.last_seen {
            map.insert(fields::LAST_SEEN.into(), ts.into());
        }
        if let Some(online) = self.is_online {
            map.insert(fields::IS_ONLINE.into(), online.into());
        }
        if let Some(elapsed) = self.time_since_update_ms {
            map.insert(fields::TIME_SINCE_UPDATE_MS.into(), elapsed.into());
        }
        if let Some(mode) = self.discovery_mode {
            map.insert(fields::DISCOVERY_MODE.into(), mode.into());
        }
        if let Some(ts) = self.last_discovery_update {
            map.insert(fields::LAST_DISCOVERY_UPDATE.into(), ts.into());
        }
        if let Some(flag) = self.physical_override {
            map.insert(fields::PHYSICAL_OVERRIDE.into(), flag.into());
        }
        if self.removed {
            map.insert(fields::REMOVED.into(), true.into());
        }
        if let Some(ts) = self.registered_at {
            map.insert(fields::REGISTERED_AT.into(), ts.into());
        }
        Value::Object(map)
    }
}

/// 时间戳字段：接受整数、浮点数或纯数字字符串（毫秒）。
fn timestamp_ms(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|ms| ms as i64)),
        Value::String(raw) => raw.trim().parse::<i64>().ok(),
        _ => None,
    }
}
