//! Provisioning run: authenticate, pick or create an entitlement, return its token.

use clap::ValueEnum;
use tracing::info;

use crate::api::auth::AuthClient;
use crate::api::lifecycle::{CreateRequest, Created, Transition};
use crate::api::types::Entitlement;
use crate::api::{http_client, FlexClient};
use crate::clipboard::{copy_or_warn, Clipboard};
use crate::config::ProvisionerConfig;
use crate::credentials::Credentials;
use crate::errors::{ProvisionError, ProvisionResult};
use crate::logging::{log_entitlement_event, EntitlementEvent};
use crate::selection::{first_inactive, resolve_configuration_id};

/// Configuration names accepted on the command line.
///
/// Each one must have a matching section in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigName {
    Fortigate,
}

impl ConfigName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigName::Fortigate => "fortigate",
        }
    }
}

impl std::fmt::Display for ConfigName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to the entitlement whose token we return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reactivated,
    Regenerated,
    Created,
    /// Mirrors [`Transition::Unchanged`]. Selection only yields STOPPED or
    /// PENDING entitlements, so a provisioning run never reports it.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOutcome {
    pub serial_number: String,
    pub token: String,
    pub action: Action,
    /// Whether the token also went to the clipboard
    pub copied: bool,
}

/// Exchange credentials for a token and build the authenticated client.
pub async fn authenticate(
    config: &ProvisionerConfig,
    credentials: &Credentials,
) -> ProvisionResult<FlexClient> {
    let http = http_client(&config.api)?;
    let token = AuthClient::new(http.clone(), &config.api)?
        .get_oauth_token(credentials)
        .await?;
    Ok(FlexClient::with_http(
        http,
        config.api.base_url()?,
        token.access_token,
    ))
}

/// Full run: authenticate, provision, copy to the clipboard.
pub async fn run(
    config: &ProvisionerConfig,
    credentials: &Credentials,
    name: ConfigName,
    clipboard: &mut dyn Clipboard,
) -> ProvisionResult<ProvisionOutcome> {
    let client = authenticate(config, credentials).await?;
    let mut outcome = Provisioner::new(config, client)
        .provision(name.as_str())
        .await?;
    outcome.copied = copy_or_warn(clipboard, &outcome.token);
    Ok(outcome)
}

/// Drives the query and lifecycle calls for one named configuration.
///
/// Mutates at most one entitlement per call.
#[derive(Debug)]
pub struct Provisioner<'a> {
    config: &'a ProvisionerConfig,
    client: FlexClient,
}

impl<'a> Provisioner<'a> {
    pub fn new(config: &'a ProvisionerConfig, client: FlexClient) -> Self {
        Self { config, client }
    }

    pub async fn provision(&self, config_name: &str) -> ProvisionResult<ProvisionOutcome> {
        let profile = self.config.profile(config_name)?;
        let program_serial = self.config.general.flex_serial.as_str();

        let configs = self
            .client
            .list_configurations(program_serial, self.config.general.account_id)
            .await?;
        let config_id = resolve_configuration_id(&configs, &profile.configuration)?;
        info!(
            profile = %config_name,
            configuration = %profile.configuration,
            config_id = config_id,
            "Resolved configuration"
        );

        let entitlements = self
            .client
            .list_entitlements(program_serial, config_id)
            .await?;

        let (entitlement, action) = match first_inactive(&entitlements) {
            Some(selected) => {
                log_entitlement_event(
                    EntitlementEvent::Selected,
                    &selected.serial_number,
                    Some(selected.status.as_str()),
                );
                let transition = self
                    .client
                    .advance(selected, self.config.provisioning.unhandled_status)
                    .await?;
                let action = match &transition {
                    Transition::Reactivated(_) => Action::Reactivated,
                    Transition::Regenerated(_) => Action::Regenerated,
                    Transition::Unchanged(_) => Action::Unchanged,
                };
                (transition.into_entitlement(), action)
            }
            None => {
                info!(
                    config_id = config_id,
                    existing = entitlements.len(),
                    "No stopped or pending entitlement, creating one"
                );
                let request =
                    CreateRequest::single(config_id, self.config.description_for(profile))
                        .end_date(self.config.provisioning.end_date()?)
                        .folder_id(profile.folder_id);
                let created = match self.client.create_entitlements(&request).await? {
                    Created::Single(entitlement) => entitlement,
                    Created::Batch(envelope) => envelope
                        .entitlements
                        .into_iter()
                        .next()
                        .ok_or_else(|| {
                            ProvisionError::EmptyResponse("entitlements/vm/create".to_string())
                        })?,
                };
                (created, Action::Created)
            }
        };

        let token = token_of(&entitlement)?;
        Ok(ProvisionOutcome {
            serial_number: entitlement.serial_number,
            token,
            action,
            copied: false,
        })
    }
}

fn token_of(entitlement: &Entitlement) -> ProvisionResult<String> {
    entitlement
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ProvisionError::MissingToken(entitlement.serial_number.clone()))
}
