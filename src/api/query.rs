//! Read-only FortiFlex endpoints.

use tracing::debug;

use super::types::{
    Configuration, ConfigsListRequest, ConfigurationsEnvelope, Entitlement,
    EntitlementsEnvelope, EntitlementsListRequest, Program, ProgramsEnvelope,
};
use super::FlexClient;
use crate::errors::ProvisionResult;

impl FlexClient {
    /// `programs/list`: every program visible to the API user.
    pub async fn list_programs(&self) -> ProvisionResult<Vec<Program>> {
        let envelope: ProgramsEnvelope = self.post_empty("programs/list").await?;
        debug!(count = envelope.programs.len(), "Listed programs");
        Ok(envelope.programs)
    }

    /// `configs/list`: configurations of a program, optionally filtered by account.
    pub async fn list_configurations(
        &self,
        program_serial: &str,
        account_id: Option<i64>,
    ) -> ProvisionResult<Vec<Configuration>> {
        let body = ConfigsListRequest {
            program_serial_number: program_serial,
            account_id,
        };
        let envelope: ConfigurationsEnvelope = self.post_json("configs/list", &body).await?;
        debug!(
            program = %program_serial,
            count = envelope.configs.len(),
            "Listed configurations"
        );
        Ok(envelope.configs)
    }

    /// `entitlements/list`: entitlements of one configuration, in API order.
    pub async fn list_entitlements(
        &self,
        program_serial: &str,
        config_id: i64,
    ) -> ProvisionResult<Vec<Entitlement>> {
        let body = EntitlementsListRequest {
            program_serial_number: program_serial,
            config_id,
        };
        let envelope: EntitlementsEnvelope = self.post_json("entitlements/list", &body).await?;
        debug!(
            config_id = config_id,
            count = envelope.entitlements.len(),
            "Listed entitlements"
        );
        Ok(envelope.entitlements)
    }
}
