//! Wire types for the FortiFlex v2 API.
//!
//! Field names follow the API's camelCase JSON. Everything the provisioner
//! does not act on is optional so new fields or omitted ones never break
//! decoding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Common envelope fields present on every FortiFlex response.
///
/// `status == 0` is success; anything else is an API-level failure even
/// when the HTTP status is 2xx.
pub trait Envelope {
    fn status(&self) -> i64;
    fn message(&self) -> Option<&str>;
}

/// Response from `programs/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramsEnvelope {
    #[serde(default)]
    pub status: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub programs: Vec<Program>,
}

/// Response from `configs/list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigurationsEnvelope {
    #[serde(default)]
    pub status: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub configs: Vec<Configuration>,
}

/// Response from every `entitlements/*` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitlementsEnvelope {
    #[serde(default)]
    pub status: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub entitlements: Vec<Entitlement>,
}

impl Envelope for ProgramsEnvelope {
    fn status(&self) -> i64 {
        self.status
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl Envelope for ConfigurationsEnvelope {
    fn status(&self) -> i64 {
        self.status
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl Envelope for EntitlementsEnvelope {
    fn status(&self) -> i64 {
        self.status
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Response from the OAuth token endpoint.
#[derive(Clone, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// A FortiFlex program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub serial_number: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A provisioning template within a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub program_serial_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Entitlement status as reported by the service.
///
/// Unknown values are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntitlementStatus {
    Active,
    Stopped,
    Pending,
    Expired,
    Other(String),
}

impl EntitlementStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EntitlementStatus::Active => "ACTIVE",
            EntitlementStatus::Stopped => "STOPPED",
            EntitlementStatus::Pending => "PENDING",
            EntitlementStatus::Expired => "EXPIRED",
            EntitlementStatus::Other(s) => s,
        }
    }

    /// STOPPED and PENDING entitlements can be brought back into use.
    pub fn is_inactive(&self) -> bool {
        matches!(self, EntitlementStatus::Stopped | EntitlementStatus::Pending)
    }
}

impl From<String> for EntitlementStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ACTIVE" => EntitlementStatus::Active,
            "STOPPED" => EntitlementStatus::Stopped,
            "PENDING" => EntitlementStatus::Pending,
            "EXPIRED" => EntitlementStatus::Expired,
            _ => EntitlementStatus::Other(s),
        }
    }
}

impl From<EntitlementStatus> for String {
    fn from(status: EntitlementStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for EntitlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A license grant instance. Identity is `serial_number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    pub serial_number: String,
    pub status: EntitlementStatus,
    #[serde(default)]
    pub config_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    /// VM activation token, present once the entitlement has been activated
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_status: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

// === Request Bodies ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigsListRequest<'a> {
    pub program_serial_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntitlementsListRequest<'a> {
    pub program_serial_number: &'a str,
    pub config_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SerialNumberRequest<'a> {
    pub serial_number: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateVmRequest<'a> {
    pub config_id: i64,
    pub count: u32,
    pub description: &'a str,
    /// Always serialized; `null` means no end date.
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<i64>,
}

#[derive(Serialize)]
pub(crate) struct PasswordGrantRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub client_id: &'a str,
    pub grant_type: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_entitlements_envelope() {
        let json = r#"{
            "status": 0,
            "message": "Request processed successfully",
            "error": null,
            "entitlements": [
                {
                    "serialNumber": "FGVMMLTM00000001",
                    "configId": 42,
                    "description": "lab",
                    "status": "STOPPED",
                    "token": "",
                    "tokenStatus": "USED",
                    "startDate": "2024-01-01T00:00:00",
                    "endDate": "2025-01-01T00:00:00"
                },
                {
                    "serialNumber": "FGVMMLTM00000002",
                    "status": "SUSPENDED"
                }
            ]
        }"#;

        let envelope: EntitlementsEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status(), 0);
        assert_eq!(envelope.entitlements.len(), 2);
        assert_eq!(envelope.entitlements[0].status, EntitlementStatus::Stopped);
        assert_eq!(envelope.entitlements[0].config_id, Some(42));
        assert_eq!(
            envelope.entitlements[1].status,
            EntitlementStatus::Other("SUSPENDED".to_string())
        );
    }

    #[test]
    fn unknown_status_keeps_its_text() {
        let status = EntitlementStatus::from("SUSPENDED".to_string());
        assert_eq!(status.to_string(), "SUSPENDED");
        assert!(!status.is_inactive());
        assert!(EntitlementStatus::Stopped.is_inactive());
        assert!(EntitlementStatus::Pending.is_inactive());
        assert!(!EntitlementStatus::Active.is_inactive());
    }

    #[test]
    fn create_request_serializes_null_end_date() {
        let body = CreateVmRequest {
            config_id: 7,
            count: 1,
            description: "Provisioned by Flex Provisioner",
            end_date: None,
            folder_id: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "configId": 7,
                "count": 1,
                "description": "Provisioned by Flex Provisioner",
                "endDate": null
            })
        );
    }

    #[test]
    fn configs_request_omits_missing_account() {
        let body = ConfigsListRequest {
            program_serial_number: "ELAVMS0000000001",
            account_id: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"programSerialNumber": "ELAVMS0000000001"})
        );
    }

    #[test]
    fn oauth_token_debug_hides_secret() {
        let token: OAuthToken =
            serde_json::from_str(r#"{"access_token":"abc123","expires_in":3600,"token_type":"Bearer"}"#)
                .unwrap();
        assert_eq!(token.expires_in, Some(3600));
        assert!(!format!("{:?}", token).contains("abc123"));
    }
}
