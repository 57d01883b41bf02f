use std::sync::Arc;

use domain::DeviceId;
use parking_registry::{RegistryError, ThresholdService, ThresholdSource};
use parking_storage::{InMemoryThresholdStore, ThresholdStore};

#[tokio::test]
async fn resolve_falls_back_in_order() {
    let store = Arc::new(InMemoryThresholdStore::new());
    let service = ThresholdService::new(store.clone());

    let fallback = service.resolve(DeviceId::Slot(1)).await.expect("resolve");
    assert_eq!(fallback.value, 45);
    assert_eq!(fallback.source, ThresholdSource::Fallback);

    service.set(60, None, 10).await.expect("set default");
    let default = service.resolve(DeviceId::Slot(1)).await.expect("resolve");
    assert_eq!(default.value, 60);
    assert_eq!(default.source, ThresholdSource::Default);
    assert!(store.list_thresholds().await.expect("list").update_required);

    service
        .set(20, Some(DeviceId::Slot(1)), 20)
        .await
        .expect("set device");
    let device = service.resolve(DeviceId::Slot(1)).await.expect("resolve");
    assert_eq!(device.value, 20);
    assert_eq!(device.source, ThresholdSource::Device);
    assert_eq!(device.updated_at, Some(20));
}

#[tokio::test]
async fn list_seeds_default_and_rejects_out_of_range() {
    let service = ThresholdService::new(Arc::new(InMemoryThresholdStore::new()));
    let table = service.list(5).await.expect("list");
    let default = table.entries.get("default").expect("default");
    assert_eq!(default.value, 45);
    assert!(!table.update_required);

    assert!(matches!(
        service.set(201, None, 1).await,
        Err(RegistryError::Invalid(_))
    ));
    assert!(matches!(
        service.set(-1, None, 1).await,
        Err(RegistryError::Invalid(_))
    ));
    service.set(0, None, 1).await.expect("zero allowed");
    service.set(200, None, 1).await.expect("max allowed");
}
