//! 设备记录字段名（与已部署的固件、看板保持一致的线上格式）。

pub const PARKING_STATUS: &str = "Parking Status";
pub const SENSOR_ERROR: &str = "Sensor Error";
pub const SYSTEM_STATUS: &str = "System Status";
pub const MAC_ADDRESS: &str = "MAC Address";
pub const LAST_HEALTH_PING: &str = "lastHealthPing";
pub const LAST_SEEN: &str = "lastSeen";
pub const IS_ONLINE: &str = "isOnline";
pub const TIME_SINCE_UPDATE_MS: &str = "timeSinceUpdateMs";
pub const DISCOVERY_MODE: &str = "discoveryMode";
pub const LAST_DISCOVERY_UPDATE: &str = "lastDiscoveryUpdate";
pub const PHYSICAL_OVERRIDE: &str = "physicalOverride";
pub const REMOVED: &str = "removed";
pub const REGISTERED_AT: &str = "registeredAt";
