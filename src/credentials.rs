//! Operator credentials for the FortiFlex API.
//!
//! Sources are tried in order:
//! 1. `FLEXPROV_API_USERNAME` / `FLEXPROV_API_PASSWORD` environment variables
//! 2. The credentials file named by `credentials.file` (keys `api_username`
//!    and `api_token`, `api_password` is accepted too)
//! 3. The OS keyring, when `credentials.use_keyring` is set
//!
//! ## Keyring Layout
//!
//! - Service: `flex-provisioner`
//! - Entry `api_username`: the API username
//! - Entry `<username>`: the API password

use std::env;
use std::fmt;
use std::path::Path;

use config::Config;
use serde::Deserialize;
use tracing::debug;

use crate::config::{file_source, CredentialsConfig};
use crate::errors::{ProvisionError, ProvisionResult};

/// Service name for keyring storage.
const KEYRING_SERVICE: &str = "flex-provisioner";

/// Keyring entry that stores the username.
const KEYRING_USERNAME_ENTRY: &str = "api_username";

/// API username and password. Loaded once per run.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub api_username: String,
    #[serde(alias = "api_token")]
    pub api_password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_username", &self.api_username)
            .field("api_password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(api_username: impl Into<String>, api_password: impl Into<String>) -> Self {
        Self {
            api_username: api_username.into(),
            api_password: api_password.into(),
        }
    }

    /// Resolve credentials from the configured sources.
    pub fn load(settings: &CredentialsConfig) -> ProvisionResult<Self> {
        if let Some(creds) = Self::from_env() {
            debug!("Using API credentials from environment");
            return Ok(creds);
        }

        if let Some(path) = &settings.file {
            let creds = Self::from_file(path)?;
            debug!(path = %path.display(), "Using API credentials from file");
            return Ok(creds);
        }

        if settings.use_keyring {
            match Self::from_keyring() {
                Ok(creds) => {
                    debug!("Using API credentials from keyring");
                    return Ok(creds);
                }
                Err(e) => debug!("Keyring lookup failed: {}", e),
            }
        }

        Err(ProvisionError::MissingCredentials)
    }

    /// Both variables must be set and non-empty.
    pub fn from_env() -> Option<Self> {
        let username = env::var("FLEXPROV_API_USERNAME").ok()?;
        let password = env::var("FLEXPROV_API_PASSWORD").ok()?;
        if username.trim().is_empty() || password.is_empty() {
            return None;
        }
        Some(Self::new(username.trim(), password))
    }

    /// Read a credentials file. The extension may be omitted, as with the
    /// main config file.
    pub fn from_file(path: &Path) -> ProvisionResult<Self> {
        let creds: Self = Config::builder()
            .add_source(file_source(path).required(true))
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| {
                ProvisionError::CredentialsError(format!("{}: {e}", path.display()))
            })?;

        if creds.api_username.trim().is_empty() || creds.api_password.is_empty() {
            return Err(ProvisionError::CredentialsError(format!(
                "{}: api_username and api_token must not be empty",
                path.display()
            )));
        }
        Ok(creds)
    }

    fn from_keyring() -> Result<Self, keyring::Error> {
        let username = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USERNAME_ENTRY)?.get_password()?;
        let password = keyring::Entry::new(KEYRING_SERVICE, &username)?.get_password()?;
        Ok(Self::new(username, password))
    }
}
