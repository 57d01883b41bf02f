//! 路由级测试：不绑定端口，直接以 oneshot 驱动 Router。

use crate::{build_app, build_state};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use parking_config::AppConfig;
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_config(kill_switch: bool) -> AppConfig {
    AppConfig {
        http_addr: "127.0.0.1:0".to_string(),
        redis_url: None,
        redis_prefix: "sparking".to_string(),
        jwt_secret: "test-secret".to_string(),
        jwt_session_ttl_seconds: 900,
        heartbeat_timeout_ms: 40_000,
        discovery_timeout_ms: 65_000,
        liveness_interval_seconds: 30,
        kill_switch,
        api_log_capacity: 40,
    }
}

fn make_router(kill_switch: bool) -> Router {
    let state = build_state(&test_config(kill_switch)).expect("state");
    build_app(state)
}

async fn call(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp
        .into_body()
        .collect()
        .await
        .expect("body collect failed")
        .to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("body is not valid JSON")
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn send_json(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

/// 注册首个用户（成为管理员）并登录，返回会话 token
async fn operator_token(router: &Router) -> String {
    let (status, _) = call(
        router,
        send_json(
            "POST",
            "/api/auth/register",
            json!({"username": "operator", "password": "pw-1"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = call(
        router,
        send_json(
            "POST",
            "/api/auth/login",
            json!({"username": "operator", "password": "pw-1"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"]
        .as_str()
        .expect("token")
        .to_string()
}

#[tokio::test]
async fn health_sets_request_id_headers() {
    let router = make_router(false);
    let resp = router.oneshot(get("/health")).await.expect("oneshot failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert!(resp.headers().contains_key("x-trace-id"));
}

#[tokio::test]
async fn register_by_mac_returns_created_then_ok() {
    let router = make_router(false);
    let (status, body) = call(&router, post_empty("/api/parking/register/AA:BB:CC:DD:EE:01")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["deviceId"], 1);
    assert_eq!(body["data"]["isNewDevice"], true);

    let (status, body) = call(&router, post_empty("/api/parking/register/AA:BB:CC:DD:EE:01")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deviceId"], 1);
    assert_eq!(body["data"]["isNewDevice"], false);

    let (status, body) = call(&router, post_empty("/api/parking/register/not-a-mac")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID.REQUEST");

    let (status, body) = call(&router, get("/api/parking/mappings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["nextId"], 2);
    assert_eq!(body["data"]["mappings"][0]["macAddress"], "AA:BB:CC:DD:EE:01");
}

#[tokio::test]
async fn sensor_and_health_reports_flow_into_status_update() {
    let router = make_router(false);
    let (status, _) = call(&router, post_empty("/api/parking/init/1")).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(&router, post_empty("/api/parking/init/1")).await;
    assert_eq!(status, StatusCode::OK);

    for device in [json!("master"), json!(1)] {
        let (status, _) = call(
            &router,
            send_json("POST", "/api/parking/health", json!({"deviceId": device}), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = call(
        &router,
        send_json("POST", "/api/parking/sensor/1", json!({"distance": 20}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["Parking Status"], "occupied");

    let (status, body) = call(&router, post_empty("/api/parking/status/update")).await;
    assert_eq!(status, StatusCode::OK);
    // 主机与 1 号车位同时上线
    assert_eq!(body["data"]["wentOnline"], 2);

    let (status, body) = call(&router, get("/api/parking/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isOnline"], true);
    assert_eq!(body["data"]["System Status"], "online");

    let (status, body) = call(&router, get("/api/logs?limit=10")).await;
    assert_eq!(status, StatusCode::OK);
    let logs = body["data"].as_array().expect("logs");
    assert_eq!(logs.len(), 5);
    assert_eq!(logs[0]["endpoint"], "/api/parking/sensor/1");
}

#[tokio::test]
async fn sensor_rejects_invalid_input() {
    let router = make_router(false);
    let (status, _) = call(
        &router,
        send_json("POST", "/api/parking/sensor/abc", json!({"distance": 20}), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &router,
        send_json("POST", "/api/parking/sensor/2", json!({}), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = call(&router, get("/api/parking/9")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn kill_switch_blocks_parking_routes_only() {
    let router = make_router(true);
    let (status, body) = call(&router, post_empty("/api/parking/register/AA:BB:CC:DD:EE:01")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["data"]["killSwitchEnabled"], true);
    assert_eq!(body["error"]["code"], "SERVICE.KILL_SWITCH");

    let (status, body) = call(&router, get("/api/kill-switch")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enabled"], true);

    let (status, _) = call(&router, get("/api/auth/checkAdminConfig")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn dashboard_writes_require_session() {
    let router = make_router(false);
    call(&router, post_empty("/api/parking/init/1")).await;

    let update = json!({"parkingStatus": "occupied"});
    let (status, _) = call(&router, send_json("PUT", "/api/parking/1", update.clone(), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(
        &router,
        send_json("PUT", "/api/parking/1", update.clone(), Some("bogus")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = operator_token(&router).await;
    let (status, body) = call(
        &router,
        send_json("PUT", "/api/parking/1", update, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"]["Parking Status"], "occupied");

    let (status, _) = call(
        &router,
        send_json(
            "PUT",
            "/api/parking/1",
            json!({"parkingStatus": "unknown"}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &router,
        send_json(
            "POST",
            "/api/parking/config/threshold",
            json!({"value": 30}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn manual_mappings_conflict_and_soft_delete() {
    let router = make_router(false);
    let token = operator_token(&router).await;
    let mapping = json!({"macAddress": "AA:BB:CC:DD:EE:05", "deviceId": 5});

    let (status, _) = call(
        &router,
        send_json("POST", "/api/parking/mappings/manage", mapping.clone(), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = call(
        &router,
        send_json("POST", "/api/parking/mappings/manage", mapping, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "RESOURCE.CONFLICT");

    let delete = Request::builder()
        .method("DELETE")
        .uri("/api/parking/mappings/manage?macAddress=AA:BB:CC:DD:EE:05")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    let (status, body) = call(&router, delete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deviceId"], 5);

    let (_, body) = call(&router, get("/api/parking/mappings")).await;
    assert_eq!(body["data"]["mappings"], json!([]));
    assert_eq!(body["data"]["nextId"], 6);
}

#[tokio::test]
async fn thresholds_resolve_with_source() {
    let router = make_router(false);
    let (_, body) = call(&router, get("/api/parking/config/threshold/3")).await;
    assert_eq!(body["data"]["threshold"], 45);
    assert_eq!(body["data"]["source"], "fallback");

    let token = operator_token(&router).await;
    let (status, _) = call(
        &router,
        send_json(
            "POST",
            "/api/parking/config/threshold",
            json!({"value": 250}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &router,
        send_json(
            "POST",
            "/api/parking/config/threshold",
            json!({"value": 60}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["key"], "default");

    let (_, body) = call(&router, get("/api/parking/config/threshold")).await;
    assert_eq!(body["data"]["thresholds"]["default"]["value"], 60);
    assert_eq!(body["data"]["updateRequired"], true);

    let (_, body) = call(&router, get("/api/parking/config/threshold/3")).await;
    assert_eq!(body["data"]["threshold"], 60);
    assert_eq!(body["data"]["source"], "default");
}

#[tokio::test]
async fn second_registration_needs_admin_password() {
    let router = make_router(false);
    let (_, body) = call(&router, get("/api/auth/checkAdminConfig")).await;
    assert_eq!(body["data"]["adminPasswordSet"], false);

    let token = operator_token(&router).await;
    let (_, body) = call(&router, get("/api/auth/checkAdminConfig")).await;
    assert_eq!(body["data"]["adminPasswordSet"], true);

    let (status, _) = call(
        &router,
        send_json(
            "POST",
            "/api/auth/register",
            json!({"username": "guest", "password": "pw-2"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &router,
        send_json(
            "POST",
            "/api/auth/setAdminPassword",
            json!({"adminPassword": "gate", "currentUserPassword": "pw-1"}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &router,
        send_json(
            "POST",
            "/api/auth/register",
            json!({"username": "guest", "password": "pw-2", "adminPassword": "gate"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["isAdmin"], false);

    let (status, body) = call(
        &router,
        send_json("POST", "/api/auth/refresh-session", json!({}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "operator");
    assert_eq!(body["data"]["isAdmin"], true);
}
