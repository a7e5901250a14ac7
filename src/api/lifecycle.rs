//! Entitlement lifecycle transitions.
//!
//! The remote service owns every status change. This module only requests
//! them:
//!
//! | Current status | Request                    |
//! |----------------|----------------------------|
//! | `STOPPED`      | `entitlements/reactivate`  |
//! | `PENDING`      | `entitlements/vm/token`    |
//! | anything else  | none (see [`UnhandledStatusPolicy`]) |
//!
//! New entitlements are created with `entitlements/vm/create`.

use chrono::NaiveDateTime;
use tracing::warn;

use super::types::{
    CreateVmRequest, Entitlement, EntitlementStatus, EntitlementsEnvelope, SerialNumberRequest,
};
use super::FlexClient;
use crate::config::UnhandledStatusPolicy;
use crate::errors::{ProvisionError, ProvisionResult};
use crate::logging::{log_entitlement_event, EntitlementEvent};

const REACTIVATE_PATH: &str = "entitlements/reactivate";
const REGENERATE_PATH: &str = "entitlements/vm/token";
const CREATE_PATH: &str = "entitlements/vm/create";

/// Format FortiFlex expects for `endDate`.
const END_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Result of [`FlexClient::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// A STOPPED entitlement was reactivated
    Reactivated(Entitlement),
    /// A PENDING entitlement got a fresh token
    Regenerated(Entitlement),
    /// Status had no transition and the passthrough policy applied.
    /// Never produced by [`crate::provisioner::run`].
    Unchanged(Entitlement),
}

impl Transition {
    pub fn entitlement(&self) -> &Entitlement {
        match self {
            Transition::Reactivated(e) | Transition::Regenerated(e) | Transition::Unchanged(e) => e,
        }
    }

    pub fn into_entitlement(self) -> Entitlement {
        match self {
            Transition::Reactivated(e) | Transition::Regenerated(e) | Transition::Unchanged(e) => e,
        }
    }
}

/// Parameters for `entitlements/vm/create`.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    pub config_id: i64,
    pub count: u32,
    pub description: String,
    pub end_date: Option<NaiveDateTime>,
    pub folder_id: Option<i64>,
}

impl CreateRequest {
    /// One entitlement with no end date and no folder.
    pub fn single(config_id: i64, description: impl Into<String>) -> Self {
        Self {
            config_id,
            count: 1,
            description: description.into(),
            end_date: None,
            folder_id: None,
        }
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn end_date(mut self, end_date: Option<NaiveDateTime>) -> Self {
        self.end_date = end_date;
        self
    }

    pub fn folder_id(mut self, folder_id: Option<i64>) -> Self {
        self.folder_id = folder_id;
        self
    }
}

/// Result of [`FlexClient::create_entitlements`].
#[derive(Debug, Clone)]
pub enum Created {
    /// `count == 1`: the one record, unwrapped from the envelope
    Single(Entitlement),
    /// `count > 1`: the envelope as returned
    Batch(EntitlementsEnvelope),
}

impl FlexClient {
    /// Reactivate a STOPPED entitlement.
    pub async fn reactivate(&self, serial_number: &str) -> ProvisionResult<Entitlement> {
        let body = SerialNumberRequest { serial_number };
        let envelope: EntitlementsEnvelope = self.post_json(REACTIVATE_PATH, &body).await?;
        let entitlement = first_entitlement(envelope, REACTIVATE_PATH)?;
        log_entitlement_event(EntitlementEvent::Reactivated, serial_number, None);
        Ok(entitlement)
    }

    /// Regenerate the token of a PENDING entitlement.
    pub async fn regenerate_token(&self, serial_number: &str) -> ProvisionResult<Entitlement> {
        let body = SerialNumberRequest { serial_number };
        let envelope: EntitlementsEnvelope = self.post_json(REGENERATE_PATH, &body).await?;
        let entitlement = first_entitlement(envelope, REGENERATE_PATH)?;
        log_entitlement_event(EntitlementEvent::Regenerated, serial_number, None);
        Ok(entitlement)
    }

    /// Move a selected entitlement to a usable state.
    ///
    /// Statuses other than STOPPED and PENDING issue no request; `policy`
    /// decides whether that is an error or a passthrough.
    ///
    /// [`crate::provisioner::run`] only hands this STOPPED or PENDING
    /// entitlements (see [`crate::selection::first_inactive`]), so the policy
    /// and [`Transition::Unchanged`] only come into play for direct callers.
    pub async fn advance(
        &self,
        entitlement: &Entitlement,
        policy: UnhandledStatusPolicy,
    ) -> ProvisionResult<Transition> {
        match &entitlement.status {
            EntitlementStatus::Stopped => self
                .reactivate(&entitlement.serial_number)
                .await
                .map(Transition::Reactivated),
            EntitlementStatus::Pending => self
                .regenerate_token(&entitlement.serial_number)
                .await
                .map(Transition::Regenerated),
            other => match policy {
                UnhandledStatusPolicy::Error => Err(ProvisionError::UnhandledStatus {
                    serial_number: entitlement.serial_number.clone(),
                    status: other.to_string(),
                }),
                UnhandledStatusPolicy::Passthrough => {
                    warn!(
                        serial_number = %entitlement.serial_number,
                        status = %other,
                        "No transition for entitlement status, returning it unchanged"
                    );
                    log_entitlement_event(
                        EntitlementEvent::Unchanged,
                        &entitlement.serial_number,
                        Some(other.as_str()),
                    );
                    Ok(Transition::Unchanged(entitlement.clone()))
                }
            },
        }
    }

    /// Create `request.count` new VM entitlements.
    pub async fn create_entitlements(&self, request: &CreateRequest) -> ProvisionResult<Created> {
        if request.count == 0 {
            return Err(ProvisionError::InvalidInput(
                "entitlement count must be at least 1".to_string(),
            ));
        }

        let body = CreateVmRequest {
            config_id: request.config_id,
            count: request.count,
            description: &request.description,
            end_date: request
                .end_date
                .map(|d| d.format(END_DATE_FORMAT).to_string()),
            folder_id: request.folder_id,
        };
        let envelope: EntitlementsEnvelope = self.post_json(CREATE_PATH, &body).await?;

        for entitlement in &envelope.entitlements {
            log_entitlement_event(
                EntitlementEvent::Created,
                &entitlement.serial_number,
                Some(&request.description),
            );
        }

        if request.count == 1 {
            first_entitlement(envelope, CREATE_PATH).map(Created::Single)
        } else {
            Ok(Created::Batch(envelope))
        }
    }
}

fn first_entitlement(envelope: EntitlementsEnvelope, path: &str) -> ProvisionResult<Entitlement> {
    envelope
        .entitlements
        .into_iter()
        .next()
        .ok_or_else(|| ProvisionError::EmptyResponse(path.to_string()))
}
