#![allow(dead_code)]

use httpmock::{Mock, MockServer};
use serde_json::{json, Value};

use flex_provisioner::clipboard::Clipboard;
use flex_provisioner::config::{ProfileConfig, ProvisionerConfig};
use flex_provisioner::credentials::Credentials;
use flex_provisioner::errors::ProvisionResult;

pub const API_PREFIX: &str = "/ES/api/fortiflex/v2/";
pub const AUTH_PATH: &str = "/api/v1/oauth/token/";
pub const PROGRAM_SERIAL: &str = "ELAVMS0000000001";
pub const ACCESS_TOKEN: &str = "bearer-123";
pub const CONFIG_ID: i64 = 42;

pub fn api_path(sub: &str) -> String {
    format!("{API_PREFIX}{sub}")
}

/// Config pointing both endpoints at the mock server, with a single
/// `fortigate -> Config-X` profile.
pub fn test_config(server: &MockServer) -> ProvisionerConfig {
    let mut config = ProvisionerConfig::default();
    config.general.flex_serial = PROGRAM_SERIAL.to_string();
    config.api.base_url = server.url(API_PREFIX);
    config.api.auth_url = server.url(AUTH_PATH);
    config.logging.enabled = false;
    config.profiles.insert(
        "fortigate".to_string(),
        ProfileConfig {
            configuration: "Config-X".to_string(),
            description: None,
            folder_id: None,
        },
    );
    config
}

pub fn test_credentials() -> Credentials {
    Credentials::new("api-user", "api-pass")
}

pub fn entitlement_json(serial: &str, status: &str, token: Option<&str>) -> Value {
    json!({
        "serialNumber": serial,
        "configId": CONFIG_ID,
        "description": "lab",
        "status": status,
        "token": token,
        "tokenStatus": if token.is_some() { "NOTUSED" } else { "" },
        "startDate": "2024-01-01T00:00:00",
        "endDate": null
    })
}

pub fn envelope(entitlements: Vec<Value>) -> Value {
    json!({
        "status": 0,
        "message": "Request processed successfully",
        "error": null,
        "entitlements": entitlements
    })
}

pub async fn mock_auth(server: &MockServer) -> Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method("POST").path(AUTH_PATH).json_body(json!({
                "username": "api-user",
                "password": "api-pass",
                "client_id": "flexvm",
                "grant_type": "password"
            }));
            then.status(200).json_body(json!({
                "access_token": ACCESS_TOKEN,
                "expires_in": 3600,
                "token_type": "Bearer",
                "scope": "read write",
                "refresh_token": "refresh-456"
            }));
        })
        .await
}

/// `configs/list` returning Config-Y (41) and Config-X (42).
pub async fn mock_configs(server: &MockServer) -> Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method("POST")
                .path(api_path("configs/list"))
                .header("authorization", format!("Bearer {ACCESS_TOKEN}"))
                .json_body(json!({ "programSerialNumber": PROGRAM_SERIAL }));
            then.status(200).json_body(json!({
                "status": 0,
                "message": "Request processed successfully",
                "configs": [
                    { "id": 41, "name": "Config-Y", "programSerialNumber": PROGRAM_SERIAL, "status": "ACTIVE" },
                    { "id": CONFIG_ID, "name": "Config-X", "programSerialNumber": PROGRAM_SERIAL, "status": "ACTIVE" }
                ]
            }));
        })
        .await
}

pub async fn mock_entitlements_list(server: &MockServer, entitlements: Vec<Value>) -> Mock<'_> {
    let body = envelope(entitlements);
    server
        .mock_async(move |when, then| {
            when.method("POST")
                .path(api_path("entitlements/list"))
                .header("authorization", format!("Bearer {ACCESS_TOKEN}"))
                .json_body(json!({
                    "programSerialNumber": PROGRAM_SERIAL,
                    "configId": CONFIG_ID
                }));
            then.status(200).json_body(body);
        })
        .await
}

/// Mock a lifecycle endpoint that takes `{serialNumber}`.
pub async fn mock_serial_call<'a>(
    server: &'a MockServer,
    sub: &str,
    serial: &str,
    response: Value,
) -> Mock<'a> {
    let path = api_path(sub);
    let serial = serial.to_string();
    server
        .mock_async(move |when, then| {
            when.method("POST")
                .path(path)
                .header("authorization", format!("Bearer {ACCESS_TOKEN}"))
                .json_body(json!({ "serialNumber": serial }));
            then.status(200).json_body(response);
        })
        .await
}

/// Catch-all for a path, used to prove an endpoint was never hit.
pub async fn mock_any<'a>(server: &'a MockServer, sub: &str) -> Mock<'a> {
    let path = api_path(sub);
    server
        .mock_async(move |when, then| {
            when.method("POST").path(path);
            then.status(500).body("unexpected call");
        })
        .await
}

/// Clipboard that remembers what it was given.
#[derive(Debug, Default)]
pub struct RecordingClipboard {
    pub copied: Vec<String>,
}

impl Clipboard for RecordingClipboard {
    fn copy(&mut self, text: &str) -> ProvisionResult<()> {
        self.copied.push(text.to_string());
        Ok(())
    }
}
