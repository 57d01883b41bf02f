use parking_storage::StorageError;

/// 巡检错误：目录读写失败。本轮放弃，由下一轮重试。
#[derive(Debug, thiserror::Error)]
pub enum LivenessError {
    #[error("directory read failed: {0}")]
    Read(StorageError),
    #[error("directory write failed: {0}")]
    Write(StorageError),
}
