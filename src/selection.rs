//! Selection policy: which configuration and which entitlement to use.

use crate::api::types::{Configuration, Entitlement};
use crate::errors::{ProvisionError, ProvisionResult};

/// First STOPPED or PENDING entitlement, in the order the API returned them.
pub fn first_inactive(entitlements: &[Entitlement]) -> Option<&Entitlement> {
    entitlements.iter().find(|e| e.status.is_inactive())
}

/// Id of the configuration whose display name is exactly `name`.
///
/// The first exact match in list order wins.
pub fn resolve_configuration_id(configs: &[Configuration], name: &str) -> ProvisionResult<i64> {
    configs
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.id)
        .ok_or_else(|| ProvisionError::ConfigurationNotFound {
            name: name.to_string(),
            available: configs.iter().map(|c| c.name.clone()).collect(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntitlementStatus;

    fn entitlement(serial: &str, status: &str) -> Entitlement {
        Entitlement {
            serial_number: serial.to_string(),
            status: EntitlementStatus::from(status.to_string()),
            config_id: Some(1),
            description: None,
            token: None,
            token_status: None,
            start_date: None,
            end_date: None,
        }
    }

    fn configuration(id: i64, name: &str) -> Configuration {
        Configuration {
            id,
            name: name.to_string(),
            program_serial_number: None,
            status: Some("ACTIVE".to_string()),
        }
    }

    #[test]
    fn picks_first_stopped_or_pending_in_order() {
        let list = vec![
            entitlement("A", "ACTIVE"),
            entitlement("B", "PENDING"),
            entitlement("C", "STOPPED"),
        ];
        assert_eq!(first_inactive(&list).unwrap().serial_number, "B");

        let list = vec![
            entitlement("A", "EXPIRED"),
            entitlement("B", "STOPPED"),
            entitlement("C", "PENDING"),
        ];
        assert_eq!(first_inactive(&list).unwrap().serial_number, "B");
    }

    #[test]
    fn none_when_nothing_is_inactive() {
        let list = vec![
            entitlement("A", "ACTIVE"),
            entitlement("B", "EXPIRED"),
            entitlement("C", "SUSPENDED"),
        ];
        assert!(first_inactive(&list).is_none());
        assert!(first_inactive(&[]).is_none());
    }

    #[test]
    fn status_match_is_exact() {
        let list = vec![entitlement("A", "stopped"), entitlement("B", "Pending")];
        assert!(first_inactive(&list).is_none());
    }

    #[test]
    fn resolves_exact_name() {
        let configs = vec![
            configuration(10, "Config-X-large"),
            configuration(11, "Config-X"),
            configuration(12, "Config-X"),
        ];
        assert_eq!(resolve_configuration_id(&configs, "Config-X").unwrap(), 11);
    }

    #[test]
    fn missing_name_is_typed_not_found() {
        let configs = vec![configuration(10, "Config-A")];
        match resolve_configuration_id(&configs, "config-a") {
            Err(ProvisionError::ConfigurationNotFound { name, available }) => {
                assert_eq!(name, "config-a");
                assert_eq!(available, vec!["Config-A".to_string()]);
            }
            other => panic!("expected ConfigurationNotFound, got {other:?}"),
        }
    }
}
