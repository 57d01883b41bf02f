//! Redis 存储实现
//!
//! 键布局（`{prefix}` 默认为 `sparking`）：
//! - `{prefix}:node:{key}`：对象节点（设备记录），Hash，字段值为 JSON 文本
//! - `{prefix}:value:{key}`：标量节点（如 `DeviceCount`），String，JSON 文本
//! - `{prefix}:objects` / `{prefix}:values`：两类节点的键索引（Set）
//! - `{prefix}:thresholds`：阈值表，Hash
//! - `{prefix}:users`、`{prefix}:admin_config`：用户与管理员口令
//!
//! 目录的批量写入使用 `MULTI/EXEC` 流水线，整批原子生效。

use crate::directory::{DeviceDirectory, DirectorySnapshot, FieldWrites, split_path, validate_writes};
use crate::error::StorageError;
use crate::models::{AdminConfigRecord, ThresholdRecord, ThresholdTable, UserRecord};
use crate::traits::{AdminConfigStore, ThresholdStore, UserStore};
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 默认键前缀
pub const DEFAULT_REDIS_PREFIX: &str = "sparking";

/// 去掉末尾冒号；空前缀退回默认值
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches(':');
    if trimmed.is_empty() {
        DEFAULT_REDIS_PREFIX.to_string()
    } else {
        trimmed.to_string()
    }
}

fn open_client(redis_url: &str) -> Result<redis::Client, StorageError> {
    redis::Client::open(redis_url).map_err(|err| StorageError::new(err.to_string()))
}

async fn connection(client: &redis::Client) -> Result<MultiplexedConnection, StorageError> {
    client
        .get_multiplexed_tokio_connection()
        .await
        .map_err(|err| StorageError::new(err.to_string()))
}

/// 字段值解码：非 JSON 文本按字符串处理。
fn decode_field(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

fn decode_hash(hash: HashMap<String, String>) -> Value {
    let map: Map<String, Value> = hash
        .into_iter()
        .map(|(field, raw)| (field, decode_field(raw)))
        .collect();
    Value::Object(map)
}

/// Redis 设备目录
pub struct RedisDeviceDirectory {
    client: redis::Client,
    prefix: String,
}

impl RedisDeviceDirectory {
    pub fn connect(redis_url: &str, prefix: &str) -> Result<Self, StorageError> {
        Ok(Self {
            client: open_client(redis_url)?,
            prefix: normalize_prefix(prefix),
        })
    }

    fn object_key(&self, key: &str) -> String {
        format!("{}:node:{}", self.prefix, key)
    }

    fn value_key(&self, key: &str) -> String {
        format!("{}:value:{}", self.prefix, key)
    }

    fn objects_index(&self) -> String {
        format!("{}:objects", self.prefix)
    }

    fn values_index(&self) -> String {
        format!("{}:values", self.prefix)
    }

    /// 在流水线中整体替换一个顶层节点。
    fn stage_node(
        &self,
        pipe: &mut redis::Pipeline,
        key: &str,
        value: &Value,
    ) -> Result<(), StorageError> {
        pipe.del(self.object_key(key)).ignore();
        pipe.del(self.value_key(key)).ignore();
        match value {
            Value::Null => {
                pipe.srem(self.objects_index(), key).ignore();
                pipe.srem(self.values_index(), key).ignore();
            }
            Value::Object(map) => {
                for (field, field_value) in map {
                    pipe.hset(self.object_key(key), field, serde_json::to_string(field_value)?)
                        .ignore();
                }
                pipe.sadd(self.objects_index(), key).ignore();
                pipe.srem(self.values_index(), key).ignore();
            }
            other => {
                pipe.set(self.value_key(key), serde_json::to_string(other)?)
                    .ignore();
                pipe.sadd(self.values_index(), key).ignore();
                pipe.srem(self.objects_index(), key).ignore();
            }
        }
        Ok(())
    }

    /// 在流水线中写入单个字段（必要时把标量节点转为对象节点）。
    fn stage_field(
        &self,
        pipe: &mut redis::Pipeline,
        key: &str,
        field: &str,
        value: &Value,
    ) -> Result<(), StorageError> {
        pipe.del(self.value_key(key)).ignore();
        pipe.srem(self.values_index(), key).ignore();
        pipe.sadd(self.objects_index(), key).ignore();
        if value.is_null() {
            pipe.hdel(self.object_key(key), field).ignore();
        } else {
            pipe.hset(self.object_key(key), field, serde_json::to_string(value)?)
                .ignore();
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DeviceDirectory for RedisDeviceDirectory {
    async fn get_all(&self) -> Result<DirectorySnapshot, StorageError> {
        let mut connection = connection(&self.client).await?;
        let objects: Vec<String> = connection.smembers(self.objects_index()).await?;
        let values: Vec<String> = connection.smembers(self.values_index()).await?;
        let mut snapshot = DirectorySnapshot::new();

        if !objects.is_empty() {
            let mut pipe = redis::pipe();
            for key in &objects {
                pipe.hgetall(self.object_key(key));
            }
            let hashes: Vec<HashMap<String, String>> = pipe.query_async(&mut connection).await?;
            for (key, hash) in objects.into_iter().zip(hashes) {
                snapshot.insert(key, decode_hash(hash));
            }
        }

        if !values.is_empty() {
            let mut pipe = redis::pipe();
            for key in &values {
                pipe.get(self.value_key(key));
            }
            let raws: Vec<Option<String>> = pipe.query_async(&mut connection).await?;
            for (key, raw) in values.into_iter().zip(raws) {
                if let Some(raw) = raw {
                    snapshot.insert(key, decode_field(raw));
                }
            }
        }
        Ok(snapshot)
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let mut connection = connection(&self.client).await?;
        let is_object: bool = connection.sismember(self.objects_index(), key).await?;
        if is_object {
            let hash: HashMap<String, String> = connection.hgetall(self.object_key(key)).await?;
            return Ok(Some(decode_hash(hash)));
        }
        let raw: Option<String> = connection.get(self.value_key(key)).await?;
        Ok(raw.map(decode_field))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        if key.is_empty() || key.contains('/') {
            return Err(StorageError::new(format!("invalid key: {key}")));
        }
        let mut connection = connection(&self.client).await?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        self.stage_node(&mut pipe, key, &value)?;
        pipe.query_async::<_, ()>(&mut connection).await?;
        Ok(())
    }

    async fn update(&self, writes: FieldWrites) -> Result<(), StorageError> {
        validate_writes(&writes)?;
        if writes.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (path, value) in &writes {
            match split_path(path)? {
                (key, None) => self.stage_node(&mut pipe, key, value)?,
                (key, Some(field)) => self.stage_field(&mut pipe, key, field, value)?,
            }
        }
        let mut connection = connection(&self.client).await?;
        pipe.query_async::<_, ()>(&mut connection).await?;
        Ok(())
    }
}

/// Redis 阈值配置存储
pub struct RedisThresholdStore {
    client: redis::Client,
    prefix: String,
}

impl RedisThresholdStore {
    pub fn connect(redis_url: &str, prefix: &str) -> Result<Self, StorageError> {
        Ok(Self {
            client: open_client(redis_url)?,
            prefix: normalize_prefix(prefix),
        })
    }

    fn table_key(&self) -> String {
        format!("{}:thresholds", self.prefix)
    }

    fn update_required_key(&self) -> String {
        format!("{}:thresholds:update_required", self.prefix)
    }
}

#[async_trait::async_trait]
impl ThresholdStore for RedisThresholdStore {
    async fn list_thresholds(&self) -> Result<ThresholdTable, StorageError> {
        let mut connection = connection(&self.client).await?;
        let hash: HashMap<String, String> = connection.hgetall(self.table_key()).await?;
        let flag: Option<String> = connection.get(self.update_required_key()).await?;
        let mut table = ThresholdTable {
            update_required: flag.as_deref() == Some("true"),
            ..ThresholdTable::default()
        };
        for (key, raw) in hash {
            // 无法解析的条目忽略，读取方会回退到默认阈值
            if let Ok(record) = serde_json::from_str::<ThresholdRecord>(&raw) {
                table.entries.insert(key, record);
            }
        }
        Ok(table)
    }

    async fn find_threshold(&self, key: &str) -> Result<Option<ThresholdRecord>, StorageError> {
        let mut connection = connection(&self.client).await?;
        let raw: Option<String> = connection.hget(self.table_key(), key).await?;
        Ok(raw.and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    async fn put_threshold(&self, key: &str, record: ThresholdRecord) -> Result<(), StorageError> {
        let mut connection = connection(&self.client).await?;
        let data = serde_json::to_string(&record)?;
        connection
            .hset::<_, _, _, ()>(self.table_key(), key, data)
            .await?;
        Ok(())
    }

    async fn set_update_required(&self, required: bool) -> Result<(), StorageError> {
        let mut connection = connection(&self.client).await?;
        connection
            .set::<_, _, ()>(self.update_required_key(), required.to_string())
            .await?;
        Ok(())
    }
}

/// Redis 用户与管理员口令存储
pub struct RedisUserStore {
    client: redis::Client,
    prefix: String,
}

impl RedisUserStore {
    pub fn connect(redis_url: &str, prefix: &str) -> Result<Self, StorageError> {
        Ok(Self {
            client: open_client(redis_url)?,
            prefix: normalize_prefix(prefix),
        })
    }

    fn users_key(&self) -> String {
        format!("{}:users", self.prefix)
    }

    fn admin_config_key(&self) -> String {
        format!("{}:admin_config", self.prefix)
    }
}

#[async_trait::async_trait]
impl UserStore for RedisUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StorageError> {
        let mut connection = connection(&self.client).await?;
        let raw: Option<String> = connection.hget(self.users_key(), username).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn create_user(&self, record: UserRecord) -> Result<bool, StorageError> {
        let mut connection = connection(&self.client).await?;
        let data = serde_json::to_string(&record)?;
        let created: bool = connection
            .hset_nx(self.users_key(), &record.username, data)
            .await?;
        Ok(created)
    }

    async fn count_users(&self) -> Result<usize, StorageError> {
        let mut connection = connection(&self.client).await?;
        let count: usize = connection.hlen(self.users_key()).await?;
        Ok(count)
    }
}

#[async_trait::async_trait]
impl AdminConfigStore for RedisUserStore {
    async fn get_admin_config(&self) -> Result<Option<AdminConfigRecord>, StorageError> {
        let mut connection = connection(&self.client).await?;
        let raw: Option<String> = connection.get(self.admin_config_key()).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn set_admin_config(&self, record: AdminConfigRecord) -> Result<(), StorageError> {
        let mut connection = connection(&self.client).await?;
        let data = serde_json::to_string(&record)?;
        connection
            .set::<_, _, ()>(self.admin_config_key(), data)
            .await?;
        Ok(())
    }
}
