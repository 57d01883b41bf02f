use api_contract::{
    DeviceIdInput, HealthPingRequest, KillSwitchRejection, MappingListResponse, DeviceMappingDto,
    SessionResponse, SetAdminPasswordRequest, ThresholdRequest,
};

#[test]
fn health_ping_accepts_numeric_and_text_ids() {
    let numeric: HealthPingRequest =
        serde_json::from_str(r#"{"deviceId":3,"systemStatus":"online"}"#).expect("parse");
    assert_eq!(numeric.device_id, Some(DeviceIdInput::Number(3)));
    assert_eq!(numeric.system_status.as_deref(), Some("online"));

    let master: HealthPingRequest = serde_json::from_str(
        r#"{"deviceId":"master","discoveryMode":true,"physicalOverride":false}"#,
    )
    .expect("parse");
    assert_eq!(
        master.device_id.as_ref().map(DeviceIdInput::as_text).as_deref(),
        Some("master")
    );
    assert_eq!(master.discovery_mode, Some(true));
}

#[test]
fn threshold_request_device_is_optional() {
    let default: ThresholdRequest = serde_json::from_str(r#"{"value":30}"#).expect("parse");
    assert_eq!(default.value, Some(30));
    assert!(default.device_id.is_none());

    let device: ThresholdRequest =
        serde_json::from_str(r#"{"value":30,"deviceId":" 4 "}"#).expect("parse");
    assert_eq!(
        device.device_id.map(|id| id.as_text()).as_deref(),
        Some("4")
    );
}

#[test]
fn responses_are_camel_case() {
    let mappings = MappingListResponse {
        mappings: vec![DeviceMappingDto {
            mac_address: "AA:BB:CC:DD:EE:FF".to_string(),
            device_id: 1,
            registered_at: Some(10),
        }],
        next_id: Some(2),
    };
    let value = serde_json::to_value(mappings).expect("serialize");
    assert_eq!(value["nextId"], 2);
    assert_eq!(value["mappings"][0]["macAddress"], "AA:BB:CC:DD:EE:FF");

    let session = SessionResponse {
        token: "t".to_string(),
        expires_at: 1,
        username: "alice".to_string(),
        is_admin: true,
    };
    let value = serde_json::to_value(session).expect("serialize");
    assert_eq!(value["expiresAt"], 1);
    assert_eq!(value["isAdmin"], true);

    let rejection = serde_json::to_value(KillSwitchRejection {
        kill_switch_enabled: true,
    })
    .expect("serialize");
    assert_eq!(rejection["killSwitchEnabled"], true);
}

#[test]
fn set_admin_password_requires_both_fields() {
    let missing = serde_json::from_str::<SetAdminPasswordRequest>(r#"{"adminPassword":"x"}"#);
    assert!(missing.is_err());
}
