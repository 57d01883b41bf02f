use parking_storage::{ApiLogRecord, ApiLogStore, InMemoryApiLogStore};

fn entry(id: usize) -> ApiLogRecord {
    ApiLogRecord {
        id: format!("log-{id}"),
        device_id: "1".to_string(),
        endpoint: "/api/parking/health".to_string(),
        method: "POST".to_string(),
        body: "{}".to_string(),
        success: true,
        error_message: None,
        timestamp: id as i64,
    }
}

#[tokio::test]
async fn evicts_oldest_beyond_capacity() {
    let store = InMemoryApiLogStore::with_capacity(3);
    for id in 0..5 {
        store.append(entry(id)).await.expect("append");
    }
    let logs = store.list_recent(10).await.expect("list");
    let ids: Vec<&str> = logs.iter().map(|log| log.id.as_str()).collect();
    assert_eq!(ids, vec!["log-4", "log-3", "log-2"]);

    let limited = store.list_recent(1).await.expect("list");
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, "log-4");
}

#[tokio::test]
async fn zero_capacity_keeps_one_entry() {
    let store = InMemoryApiLogStore::with_capacity(0);
    assert_eq!(store.capacity(), 1);
    store.append(entry(1)).await.expect("append");
    store.append(entry(2)).await.expect("append");
    assert_eq!(store.list_recent(10).await.expect("list").len(), 1);
}
