//! Configuration system for the provisioner.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `config.*` in the working directory (or the file named by `FLEXPROV_CONFIG`)
//! 3. `config.*` in the user configuration directory (`<config dir>/flex-provisioner/`)
//! 4. Default values (lowest priority)
//!
//! Any format the `config` crate understands works; YAML is the usual choice:
//!
//! ```yaml
//! general:
//!   flex_serial: ELAVMS0000000001
//! fortigate:
//!   configuration: Config-X
//! ```
//!
//! Every top-level section that is not one of the known ones below is a
//! *profile*, keyed by the name passed on the command line.
//!
//! # Environment Variables
//!
//! - `FLEXPROV_CONFIG` - Explicit path to the config file
//! - `FLEXPROV_FLEX_SERIAL` - Program serial number
//! - `FLEXPROV_ACCOUNT_ID` - Account id used to filter configurations
//! - `FLEXPROV_BASE_URL` - FortiFlex API base URL
//! - `FLEXPROV_AUTH_URL` - OAuth token endpoint
//! - `FLEXPROV_CLIENT_ID` - OAuth client id
//! - `FLEXPROV_TIMEOUT_SECS` - Per-request timeout
//! - `FLEXPROV_UNHANDLED_STATUS` - `error` or `passthrough`
//! - `FLEXPROV_CLIPBOARD` - Copy the token to the clipboard
//! - `FLEXPROV_LOGGING_ENABLED` - Enable logging
//! - `FLEXPROV_LOG_LEVEL` - Log level (trace, debug, info, warn, error)

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use config::Config;
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;

use crate::errors::{ProvisionError, ProvisionResult};

/// Directory name under the user configuration directory.
pub const APP_DIR: &str = "flex-provisioner";

pub const DEFAULT_BASE_URL: &str = "https://support.fortinet.com/ES/api/fortiflex/v2/";
pub const DEFAULT_AUTH_URL: &str = "https://customerapiauth.fortinet.com/api/v1/oauth/token/";
pub const DEFAULT_CLIENT_ID: &str = "flexvm";
pub const DEFAULT_DESCRIPTION: &str = "Provisioned by Flex Provisioner";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    /// Program-level settings
    pub general: GeneralConfig,
    /// API endpoints and client settings
    pub api: ApiConfig,
    /// Entitlement creation and lifecycle settings
    pub provisioning: ProvisioningConfig,
    /// Output side channels
    pub output: OutputConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Where to look for API credentials
    pub credentials: CredentialsConfig,
    /// Named configurations, keyed by CLI name
    #[serde(flatten)]
    pub profiles: HashMap<String, ProfileConfig>,
}

/// Program-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Program serial number (`flex_serial` in the file)
    pub flex_serial: String,
    /// Optional account filter for `configs/list`
    pub account_id: Option<i64>,
}

/// API endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// FortiFlex v2 base URL; sub-paths are joined onto it
    pub base_url: String,
    /// OAuth password-grant token endpoint
    pub auth_url: String,
    /// OAuth client id
    pub client_id: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Base URL, normalized to end with `/` so sub-paths join under it.
    pub fn base_url(&self) -> ProvisionResult<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| {
            ProvisionError::ConfigError(format!("api.base_url '{}' is invalid: {e}", self.base_url))
        })
    }

    pub fn auth_url(&self) -> ProvisionResult<Url> {
        Url::parse(self.auth_url.trim()).map_err(|e| {
            ProvisionError::ConfigError(format!("api.auth_url '{}' is invalid: {e}", self.auth_url))
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What to do with a selected entitlement whose status has no transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnhandledStatusPolicy {
    /// Fail the run with `ProvisionError::UnhandledStatus`
    #[default]
    Error,
    /// Return the entitlement unchanged and log a warning
    Passthrough,
}

/// Entitlement creation and lifecycle settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Description tag for newly created entitlements
    pub description: String,
    /// Optional end date for new entitlements (`YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`)
    pub end_date: Option<String>,
    pub unhandled_status: UnhandledStatusPolicy,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            end_date: None,
            unhandled_status: UnhandledStatusPolicy::Error,
        }
    }
}

impl ProvisioningConfig {
    /// Parse the configured end date, if any.
    pub fn end_date(&self) -> ProvisionResult<Option<NaiveDateTime>> {
        let Some(raw) = self.end_date.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
            return Ok(Some(dt));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Some)
            .ok_or_else(|| {
                ProvisionError::ConfigError(format!(
                    "provisioning.end_date must be YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, got '{raw}'"
                ))
            })
    }
}

/// Output side channels.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Copy the token to the system clipboard
    pub clipboard: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "warn".to_string(),
        }
    }
}

/// Credential source settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Credentials file (resolved like the config file; extension optional)
    pub file: Option<PathBuf>,
    /// Fall back to the OS keyring
    pub use_keyring: bool,
}

/// One named configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    /// Provider-side configuration display name
    pub configuration: String,
    /// Overrides `provisioning.description` for this profile
    #[serde(default)]
    pub description: Option<String>,
    /// Folder to place newly created entitlements in
    #[serde(default)]
    pub folder_id: Option<i64>,
}

impl ProvisionerConfig {
    /// Load configuration from the default locations and the environment.
    ///
    /// `FLEXPROV_CONFIG` replaces the directory search with a single,
    /// required file.
    pub fn load() -> ProvisionResult<Self> {
        let config = match env::var_os("FLEXPROV_CONFIG") {
            Some(path) => Self::build(&[PathSource::Required(PathBuf::from(path))])?,
            None => {
                let mut sources = Vec::new();
                if let Some(dir) = dirs::config_dir() {
                    sources.push(PathSource::Optional(dir.join(APP_DIR).join("config")));
                }
                sources.push(PathSource::Optional(PathBuf::from("config")));
                Self::build(&sources)?
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from one specific file plus the environment.
    pub fn from_file(path: &Path) -> ProvisionResult<Self> {
        let config = Self::build(&[PathSource::Required(path.to_path_buf())])?;
        config.validate()?;
        Ok(config)
    }

    fn build(sources: &[PathSource]) -> ProvisionResult<Self> {
        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.auth_url", DEFAULT_AUTH_URL)?
            .set_default("api.client_id", DEFAULT_CLIENT_ID)?
            .set_default("api.timeout_secs", 30)?
            .set_default("provisioning.description", DEFAULT_DESCRIPTION)?
            .set_default("provisioning.unhandled_status", "error")?
            .set_default("output.clipboard", false)?
            .set_default("logging.enabled", true)?
            .set_default("logging.level", "warn")?;

        for source in sources {
            builder = match source {
                PathSource::Required(path) => builder.add_source(file_source(path).required(true)),
                PathSource::Optional(path) => builder.add_source(file_source(path).required(false)),
            };
        }

        let builder = builder
            .set_override_option("general.flex_serial", env::var("FLEXPROV_FLEX_SERIAL").ok())?
            .set_override_option(
                "general.account_id",
                env::var("FLEXPROV_ACCOUNT_ID")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )?
            .set_override_option("api.base_url", env::var("FLEXPROV_BASE_URL").ok())?
            .set_override_option("api.auth_url", env::var("FLEXPROV_AUTH_URL").ok())?
            .set_override_option("api.client_id", env::var("FLEXPROV_CLIENT_ID").ok())?
            .set_override_option(
                "api.timeout_secs",
                env::var("FLEXPROV_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )?
            .set_override_option(
                "provisioning.unhandled_status",
                env::var("FLEXPROV_UNHANDLED_STATUS").ok(),
            )?
            .set_override_option(
                "output.clipboard",
                env::var("FLEXPROV_CLIPBOARD")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok()),
            )?
            .set_override_option(
                "logging.enabled",
                env::var("FLEXPROV_LOGGING_ENABLED")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok()),
            )?
            .set_override_option("logging.level", env::var("FLEXPROV_LOG_LEVEL").ok())?;

        let settings = builder
            .build()
            .map_err(|e| ProvisionError::ConfigError(format!("failed to build config: {e}")))?;

        settings.try_deserialize().map_err(|e| {
            ProvisionError::ConfigError(format!("failed to deserialize config: {e}"))
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ProvisionResult<()> {
        let serial = self.general.flex_serial.trim();
        if serial.is_empty() {
            return Err(ProvisionError::ConfigError(
                "general.flex_serial is required".to_string(),
            ));
        }
        let serial_regex = Regex::new(r"^[A-Z0-9]+$")
            .map_err(|e| ProvisionError::ConfigError(e.to_string()))?;
        if !serial_regex.is_match(serial) {
            return Err(ProvisionError::ConfigError(format!(
                "general.flex_serial must be uppercase alphanumeric, got '{serial}'"
            )));
        }

        self.api.base_url()?;
        self.api.auth_url()?;
        if self.api.client_id.trim().is_empty() {
            return Err(ProvisionError::ConfigError(
                "api.client_id cannot be empty".to_string(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(ProvisionError::ConfigError(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }

        self.provisioning.end_date()?;

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ProvisionError::ConfigError(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        for (name, profile) in &self.profiles {
            if profile.configuration.trim().is_empty() {
                return Err(ProvisionError::ConfigError(format!(
                    "{name}.configuration cannot be empty"
                )));
            }
        }

        Ok(())
    }

    /// Look up the profile for a CLI configuration name.
    pub fn profile(&self, name: &str) -> ProvisionResult<&ProfileConfig> {
        self.profiles.get(name).ok_or_else(|| {
            ProvisionError::ConfigError(format!(
                "no '{name}' section with a 'configuration' key in the config file"
            ))
        })
    }

    /// Description for new entitlements created under `profile`.
    pub fn description_for<'a>(&'a self, profile: &'a ProfileConfig) -> &'a str {
        profile
            .description
            .as_deref()
            .unwrap_or(&self.provisioning.description)
    }
}

enum PathSource {
    Required(PathBuf),
    Optional(PathBuf),
}

/// A file source for `path`. Without an extension every supported format
/// is tried, so `config` finds `config.yaml` or `config.toml`.
pub(crate) fn file_source(path: &Path) -> config::File<config::FileSourceFile, config::FileFormat> {
    if path.extension().is_some() {
        config::File::from(path)
    } else {
        config::File::with_name(&path.to_string_lossy())
    }
}
