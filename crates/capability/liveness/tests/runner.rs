use std::sync::Arc;
use std::time::Duration;

use domain::now_epoch_ms;
use parking_liveness::{LivenessPolicy, LivenessReconciler, spawn_liveness_loop};
use parking_storage::{DeviceDirectory, DirectorySnapshot, InMemoryDeviceDirectory};
use serde_json::json;

const PERIOD: Duration = Duration::from_secs(30);

fn stale_directory() -> Arc<InMemoryDeviceDirectory> {
    let now = now_epoch_ms();
    let entries = json!({
        "Devicemaster": {"lastHealthPing": now, "isOnline": true, "System Status": "online"},
        "Device1": {"lastHealthPing": now - 90_000, "isOnline": true, "System Status": "online"},
    });
    let snapshot: DirectorySnapshot = entries
        .as_object()
        .expect("object")
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Arc::new(InMemoryDeviceDirectory::with_snapshot(snapshot))
}

#[tokio::test(start_paused = true)]
async fn loop_marks_stale_devices_offline() {
    let directory = stale_directory();
    let reconciler = Arc::new(LivenessReconciler::new(
        directory.clone(),
        LivenessPolicy::default(),
    ));
    let handle = spawn_liveness_loop(reconciler, PERIOD, false);

    // 首个周期立即触发，再推进一个完整周期
    tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;
    handle.abort();

    let device = directory.get("Device1").await.expect("get").expect("device");
    assert_eq!(device["isOnline"], json!(false));
    assert_eq!(device["System Status"], json!("offline"));
    assert!(device["lastSeen"].is_i64());
    assert!(device["timeSinceUpdateMs"].as_i64().expect("elapsed") >= 90_000);

    let master = directory.get("Devicemaster").await.expect("get").expect("master");
    assert_eq!(master["isOnline"], json!(true));
}

#[tokio::test(start_paused = true)]
async fn kill_switch_keeps_loop_idle() {
    let directory = stale_directory();
    let before = directory.get_all().await.expect("snapshot");
    let reconciler = Arc::new(LivenessReconciler::new(
        directory.clone(),
        LivenessPolicy::default(),
    ));
    let handle = spawn_liveness_loop(reconciler, PERIOD, true);

    tokio::time::sleep(PERIOD * 3).await;
    handle.abort();

    assert_eq!(directory.get_all().await.expect("snapshot"), before);
}
