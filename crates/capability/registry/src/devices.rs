//! 设备登记、映射管理与设备上报。
//!
//! 所有写入都以字段路径批量提交；新设备记录与 `DeviceCount`
//! 在同一批次中写入。

use crate::error::RegistryError;
use crate::thresholds::ThresholdService;
use domain::{
    DEVICE_COUNT_KEY, DeviceId, DeviceKey, DeviceRecord, ParkingStatus, SystemStatus, fields,
    parking_status_from_distance,
};
use parking_storage::{DeviceDirectory, DirectorySnapshot, FieldWrites};
use parking_telemetry::{record_health_ping, record_registration, record_sensor_update};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// 按 MAC 登记的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub device_id: u32,
    pub is_new_device: bool,
}

/// MAC 与设备 ID 的映射。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceMapping {
    pub mac_address: String,
    pub device_id: u32,
    pub registered_at: Option<i64>,
}

/// 映射列表与下一个可用 ID。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingList {
    pub mappings: Vec<DeviceMapping>,
    /// ID 已用尽时为 None
    pub next_id: Option<u32>,
}

/// 设备初始化结果。
#[derive(Debug, Clone, PartialEq)]
pub struct InitOutcome {
    pub created: bool,
    pub data: Value,
}

/// 心跳上报。
#[derive(Debug, Clone, Default)]
pub struct HealthPing {
    pub system_status: Option<SystemStatus>,
    /// 以下两项仅对主机有效
    pub discovery_mode: Option<bool>,
    pub physical_override: Option<bool>,
}

/// 传感器上报。
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorReading {
    pub distance_cm: Option<f64>,
    pub has_sensor_error: Option<bool>,
}

/// 看板手动修改的设备字段。
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceFieldsUpdate {
    pub parking_status: Option<ParkingStatus>,
    pub sensor_error: Option<bool>,
    pub system_status: Option<SystemStatus>,
}

impl DeviceFieldsUpdate {
    /// 校验看板提交的原始字段；车位状态只允许 open / occupied。
    pub fn parse(
        parking_status: Option<&str>,
        sensor_error: Option<bool>,
        system_status: Option<&str>,
    ) -> Result<Self, RegistryError> {
        let parking_status = match parking_status {
            Some(raw) => match ParkingStatus::parse(raw) {
                Some(status @ (ParkingStatus::Open | ParkingStatus::Occupied)) => Some(status),
                _ => {
                    return Err(RegistryError::invalid(
                        "parkingStatus must be \"open\" or \"occupied\"",
                    ));
                }
            },
            None => None,
        };
        let system_status = match system_status {
            Some(raw) => Some(SystemStatus::parse(raw).ok_or_else(|| {
                RegistryError::invalid("systemStatus must be \"online\" or \"offline\"")
            })?),
            None => None,
        };
        let update = Self {
            parking_status,
            sensor_error,
            system_status,
        };
        if update.parking_status.is_none()
            && update.sensor_error.is_none()
            && update.system_status.is_none()
        {
            return Err(RegistryError::invalid("No valid update fields provided"));
        }
        Ok(update)
    }
}

/// 设备登记服务。
pub struct DeviceRegistry {
    directory: Arc<dyn DeviceDirectory>,
    thresholds: Arc<ThresholdService>,
    // 串行化 ID 分配（读取最大 ID 与写入新记录之间不能穿插）
    allocation: Mutex<()>,
}

impl DeviceRegistry {
    pub fn new(directory: Arc<dyn DeviceDirectory>, thresholds: Arc<ThresholdService>) -> Self {
        Self {
            directory,
            thresholds,
            allocation: Mutex::new(()),
        }
    }

    /// 全量目录快照。
    pub async fn snapshot(&self) -> Result<DirectorySnapshot, RegistryError> {
        Ok(self.directory.get_all().await?)
    }

    /// 读取单个设备记录。
    pub async fn get_device(&self, id: DeviceId) -> Result<Value, RegistryError> {
        let key = id.key();
        match self.directory.get(&key.to_string()).await? {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(RegistryError::NotFound("Device not found".to_string())),
        }
    }

    /// 看板手动修改设备字段，返回实际写入的字段。
    pub async fn update_device(
        &self,
        id: DeviceId,
        update: DeviceFieldsUpdate,
    ) -> Result<Map<String, Value>, RegistryError> {
        self.get_device(id).await?;
        let mut fields_map = Map::new();
        if let Some(status) = update.parking_status {
            fields_map.insert(fields::PARKING_STATUS.into(), status.as_str().into());
        }
        if let Some(error) = update.sensor_error {
            fields_map.insert(fields::SENSOR_ERROR.into(), error.into());
        }
        if let Some(status) = update.system_status {
            fields_map.insert(fields::SYSTEM_STATUS.into(), status.as_str().into());
        }
        self.write_fields(&id.key(), &fields_map).await?;
        Ok(fields_map)
    }

    /// 按 MAC 登记：已登记返回原 ID，否则分配 `max + 1`。
    pub async fn register_by_mac(
        &self,
        mac_address: &str,
        now_ms: i64,
    ) -> Result<Registration, RegistryError> {
        let _guard = self.allocation.lock().await;
        let snapshot = self.directory.get_all().await?;

        if let Some((key, record)) = find_by_mac(&snapshot, mac_address) {
            let device_id = key.id().slot().unwrap_or_default();
            if record.removed {
                // 已移除设备重新上电登记：恢复映射
                let mut writes = FieldWrites::new();
                writes.insert(key.field_path(fields::REMOVED), Value::Null);
                self.directory.update(writes).await?;
                info!(
                    target: "parking.registry",
                    event = "device_restored",
                    device_id,
                    mac_address
                );
            }
            return Ok(Registration {
                device_id,
                is_new_device: false,
            });
        }

        let Some(device_id) = next_slot_id(&snapshot) else {
            return Err(RegistryError::Conflict(
                "No device ID available for registration".to_string(),
            ));
        };
        let key = DeviceId::Slot(device_id).key();
        let record = DeviceRecord::registered(
            SystemStatus::Online,
            Some(mac_address.to_string()),
            now_ms,
        );
        let mut writes = FieldWrites::new();
        writes.insert(key.to_string(), record.to_value());
        writes.insert(DEVICE_COUNT_KEY.to_string(), Value::from(device_id));
        self.directory.update(writes).await?;

        record_registration();
        info!(
            target: "parking.registry",
            event = "device_registered",
            device_id,
            mac_address
        );
        Ok(Registration {
            device_id,
            is_new_device: true,
        })
    }

    /// 手动建立映射；MAC 或 ID 已被占用返回冲突。
    pub async fn create_mapping(
        &self,
        mac_address: &str,
        device_id: u32,
        now_ms: i64,
    ) -> Result<(), RegistryError> {
        if device_id == 0 {
            return Err(RegistryError::invalid("Device ID must be a positive number"));
        }
        let _guard = self.allocation.lock().await;
        let snapshot = self.directory.get_all().await?;

        if find_by_mac(&snapshot, mac_address).is_some() {
            return Err(RegistryError::Conflict(
                "MAC address already registered".to_string(),
            ));
        }
        let key = DeviceId::Slot(device_id).key();
        if snapshot.contains_key(&key.to_string()) {
            return Err(RegistryError::Conflict("Device ID already in use".to_string()));
        }

        let record = DeviceRecord::registered(
            SystemStatus::Offline,
            Some(mac_address.to_string()),
            now_ms,
        );
        let mut writes = FieldWrites::new();
        writes.insert(key.to_string(), record.to_value());
        let count = snapshot
            .get(DEVICE_COUNT_KEY)
            .and_then(Value::as_u64)
            .unwrap_or(0);
        if count < u64::from(device_id) {
            writes.insert(DEVICE_COUNT_KEY.to_string(), Value::from(device_id));
        }
        self.directory.update(writes).await?;

        record_registration();
        info!(
            target: "parking.registry",
            event = "mapping_created",
            device_id,
            mac_address
        );
        Ok(())
    }

    /// 软删除映射，返回被移除的设备 ID。
    pub async fn remove_mapping(&self, mac_address: &str) -> Result<u32, RegistryError> {
        let _guard = self.allocation.lock().await;
        let snapshot = self.directory.get_all().await?;
        let (key, _) = find_by_mac(&snapshot, mac_address)
            .filter(|(_, record)| !record.removed)
            .ok_or_else(|| RegistryError::NotFound("Device mapping not found".to_string()))?;

        let mut writes = FieldWrites::new();
        writes.insert(key.field_path(fields::REMOVED), Value::Bool(true));
        self.directory.update(writes).await?;

        let device_id = key.id().slot().unwrap_or_default();
        info!(
            target: "parking.registry",
            event = "mapping_removed",
            device_id,
            mac_address
        );
        Ok(device_id)
    }

    /// 列出未移除且带 MAC 的设备映射。
    pub async fn list_mappings(&self) -> Result<MappingList, RegistryError> {
        let snapshot = self.directory.get_all().await?;
        let mappings = slot_records(&snapshot)
            .filter(|(_, record)| !record.removed)
            .filter_map(|(key, record)| {
                Some(DeviceMapping {
                    mac_address: record.mac_address?,
                    device_id: key.id().slot()?,
                    registered_at: record.registered_at,
                })
            })
            .collect();
        Ok(MappingList {
            mappings,
            next_id: next_slot_id(&snapshot),
        })
    }

    /// 初始化设备：已存在返回原数据，否则写入默认记录。
    pub async fn init_device(&self, id: DeviceId, now_ms: i64) -> Result<InitOutcome, RegistryError> {
        let key = id.key();
        if let Some(existing) = self.directory.get(&key.to_string()).await? {
            return Ok(InitOutcome {
                created: false,
                data: existing,
            });
        }
        let data = DeviceRecord::registered(SystemStatus::Online, None, now_ms).to_value();
        self.directory.set(&key.to_string(), data.clone()).await?;
        info!(target: "parking.registry", event = "device_initialized", device = %key);
        Ok(InitOutcome {
            created: true,
            data,
        })
    }

    /// 记录心跳；在线标记由巡检统一计算。
    pub async fn record_health_ping(
        &self,
        id: DeviceId,
        ping: HealthPing,
        now_ms: i64,
    ) -> Result<Map<String, Value>, RegistryError> {
        let mut fields_map = Map::new();
        fields_map.insert(fields::LAST_HEALTH_PING.into(), now_ms.into());
        let status = ping.system_status.unwrap_or(SystemStatus::Online);
        fields_map.insert(fields::SYSTEM_STATUS.into(), status.as_str().into());
        if id.is_master() {
            if let Some(mode) = ping.discovery_mode {
                fields_map.insert(fields::DISCOVERY_MODE.into(), mode.into());
                fields_map.insert(fields::LAST_DISCOVERY_UPDATE.into(), now_ms.into());
            }
            if let Some(flag) = ping.physical_override {
                fields_map.insert(fields::PHYSICAL_OVERRIDE.into(), flag.into());
            }
        }
        self.write_fields(&id.key(), &fields_map).await?;
        record_health_ping();
        Ok(fields_map)
    }

    /// 应用传感器读数，返回写入的字段。
    pub async fn apply_sensor_reading(
        &self,
        id: DeviceId,
        reading: SensorReading,
    ) -> Result<Map<String, Value>, RegistryError> {
        if reading.distance_cm.is_none() && reading.has_sensor_error.is_none() {
            return Err(RegistryError::invalid(
                "Either distance or hasSensorError must be provided",
            ));
        }
        let mut fields_map = Map::new();
        if reading.has_sensor_error == Some(true) {
            fields_map.insert(fields::SENSOR_ERROR.into(), true.into());
            fields_map.insert(
                fields::PARKING_STATUS.into(),
                ParkingStatus::Unknown.as_str().into(),
            );
        } else if let Some(distance) = reading.distance_cm {
            if !distance.is_finite() {
                return Err(RegistryError::invalid("Distance must be a number"));
            }
            let threshold = self.thresholds.resolve(id).await?;
            let status = parking_status_from_distance(distance as i64, threshold.value);
            fields_map.insert(fields::PARKING_STATUS.into(), status.as_str().into());
            fields_map.insert(fields::SENSOR_ERROR.into(), false.into());
        } else {
            fields_map.insert(fields::SENSOR_ERROR.into(), false.into());
        }
        fields_map.insert(
            fields::SYSTEM_STATUS.into(),
            SystemStatus::Online.as_str().into(),
        );
        self.write_fields(&id.key(), &fields_map).await?;
        record_sensor_update();
        Ok(fields_map)
    }

    async fn write_fields(
        &self,
        key: &DeviceKey,
        fields_map: &Map<String, Value>,
    ) -> Result<(), RegistryError> {
        let writes: FieldWrites = fields_map
            .iter()
            .map(|(field, value)| (key.field_path(field), value.clone()))
            .collect();
        self.directory.update(writes).await?;
        Ok(())
    }
}

/// 快照中的车位设备记录（非对象值忽略）。
fn slot_records(snapshot: &DirectorySnapshot) -> impl Iterator<Item = (DeviceKey, DeviceRecord)> + '_ {
    snapshot.iter().filter_map(|(raw_key, value)| {
        let key = DeviceKey::parse(raw_key)?;
        key.id().slot()?;
        Some((key, DeviceRecord::from_value(value)?))
    })
}

/// 已分配的最大车位 ID（含已移除设备，ID 不复用）。
fn max_slot_id(snapshot: &DirectorySnapshot) -> u32 {
    snapshot
        .keys()
        .filter_map(|raw_key| DeviceKey::parse(raw_key)?.id().slot())
        .max()
        .unwrap_or(0)
}

/// 下一个可分配的车位 ID；超出 u32 范围时为 None。
fn next_slot_id(snapshot: &DirectorySnapshot) -> Option<u32> {
    max_slot_id(snapshot).checked_add(1)
}

/// 按 MAC 查找设备，不区分大小写；优先返回未移除的记录。
fn find_by_mac(snapshot: &DirectorySnapshot, mac_address: &str) -> Option<(DeviceKey, DeviceRecord)> {
    let mut removed_match = None;
    for (key, record) in slot_records(snapshot) {
        let matches = record
            .mac_address
            .as_deref()
            .is_some_and(|mac| mac.eq_ignore_ascii_case(mac_address));
        if !matches {
            continue;
        }
        if !record.removed {
            return Some((key, record));
        }
        removed_match.get_or_insert((key, record));
    }
    removed_match
}
