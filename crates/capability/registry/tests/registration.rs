mod support;

use domain::DeviceId;
use parking_registry::RegistryError;
use parking_storage::DeviceDirectory;
use serde_json::json;
use support::fixture;

const MAC_A: &str = "AA:BB:CC:DD:EE:01";
const MAC_B: &str = "AA:BB:CC:DD:EE:02";

#[tokio::test]
async fn register_assigns_sequential_ids_and_reuses_existing() {
    let fx = fixture();
    let first = fx.registry.register_by_mac(MAC_A, 100).await.expect("register");
    assert_eq!(first.device_id, 1);
    assert!(first.is_new_device);

    let second = fx.registry.register_by_mac(MAC_B, 200).await.expect("register");
    assert_eq!(second.device_id, 2);

    let again = fx
        .registry
        .register_by_mac("aa:bb:cc:dd:ee:01", 300)
        .await
        .expect("register again");
    assert_eq!(again.device_id, 1);
    assert!(!again.is_new_device);

    let device = fx.directory.get("Device1").await.expect("get").expect("device");
    assert_eq!(device["MAC Address"], json!(MAC_A));
    assert_eq!(device["System Status"], json!("online"));
    assert_eq!(device["Parking Status"], json!("open"));
    assert_eq!(device["registeredAt"], json!(100));
    assert_eq!(
        fx.directory.get("DeviceCount").await.expect("get"),
        Some(json!(2))
    );
}

#[tokio::test]
async fn manual_mapping_conflicts_and_count() {
    let fx = fixture();
    fx.registry
        .create_mapping(MAC_A, 5, 100)
        .await
        .expect("create mapping");
    let device = fx.directory.get("Device5").await.expect("get").expect("device");
    assert_eq!(device["System Status"], json!("offline"));
    assert_eq!(
        fx.directory.get("DeviceCount").await.expect("get"),
        Some(json!(5))
    );

    let mac_taken = fx.registry.create_mapping(MAC_A, 6, 100).await;
    assert!(matches!(mac_taken, Err(RegistryError::Conflict(_))));
    let id_taken = fx.registry.create_mapping(MAC_B, 5, 100).await;
    assert!(matches!(id_taken, Err(RegistryError::Conflict(_))));

    fx.registry
        .create_mapping(MAC_B, 2, 100)
        .await
        .expect("lower id");
    assert_eq!(
        fx.directory.get("DeviceCount").await.expect("get"),
        Some(json!(5))
    );

    let next = fx.registry.register_by_mac("AA:BB:CC:DD:EE:03", 100).await.expect("register");
    assert_eq!(next.device_id, 6);
}

#[tokio::test]
async fn remove_mapping_soft_deletes() {
    let fx = fixture();
    fx.registry.register_by_mac(MAC_A, 1).await.expect("register");
    fx.registry.register_by_mac(MAC_B, 2).await.expect("register");

    let removed = fx.registry.remove_mapping(MAC_A).await.expect("remove");
    assert_eq!(removed, 1);
    let device = fx.directory.get("Device1").await.expect("get").expect("device");
    assert_eq!(device["removed"], json!(true));

    let list = fx.registry.list_mappings().await.expect("list");
    assert_eq!(list.mappings.len(), 1);
    assert_eq!(list.mappings[0].device_id, 2);
    assert_eq!(list.next_id, Some(3));

    let missing = fx.registry.remove_mapping(MAC_A).await;
    assert!(matches!(missing, Err(RegistryError::NotFound(_))));

    // 重新登记恢复原 ID
    let restored = fx.registry.register_by_mac(MAC_A, 3).await.expect("register");
    assert_eq!(restored.device_id, 1);
    assert!(!restored.is_new_device);
    let device = fx.directory.get("Device1").await.expect("get").expect("device");
    assert!(device.get("removed").is_none());
}

#[tokio::test]
async fn init_device_creates_once() {
    let fx = fixture();
    let created = fx
        .registry
        .init_device(DeviceId::Slot(3), 10)
        .await
        .expect("init");
    assert!(created.created);
    assert_eq!(
        created.data,
        json!({"Parking Status": "open", "Sensor Error": false, "System Status": "online"})
    );

    let existing = fx
        .registry
        .init_device(DeviceId::Slot(3), 20)
        .await
        .expect("init again");
    assert!(!existing.created);
    assert_eq!(existing.data, created.data);
}

#[tokio::test]
async fn get_device_reports_missing() {
    let fx = fixture();
    let result = fx.registry.get_device(DeviceId::Slot(9)).await;
    assert!(matches!(result, Err(RegistryError::NotFound(_))));
}

#[tokio::test]
async fn exhausted_id_space_rejects_registration_without_panicking() {
    let fx = fixture();
    fx.registry
        .create_mapping(MAC_A, u32::MAX, 10)
        .await
        .expect("map highest id");

    let result = fx.registry.register_by_mac(MAC_B, 20).await;
    assert!(matches!(result, Err(RegistryError::Conflict(_))));
    assert!(fx.directory.get("Device0").await.expect("get").is_none());

    let list = fx.registry.list_mappings().await.expect("list");
    assert_eq!(list.mappings.len(), 1);
    assert_eq!(list.next_id, None);
}
