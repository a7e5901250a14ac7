//! Error types for the provisioner.
//!
//! Every fallible operation in the crate returns [`ProvisionResult`]. Nothing
//! is retried: the first error ends the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// No credential source produced a username and password.
    #[error(
        "API credentials not found (set FLEXPROV_API_USERNAME/FLEXPROV_API_PASSWORD or provide a credentials file)"
    )]
    MissingCredentials,

    /// A credential source exists but could not be read.
    #[error("failed to read credentials: {0}")]
    CredentialsError(String),

    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx HTTP status.
    #[error("server returned HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The FortiFlex envelope carried a non-zero status.
    #[error("FortiFlex API error (status {status}): {message}")]
    Api { status: i64, message: String },

    /// No configuration in the program has the requested display name.
    #[error("configuration '{name}' not found (available: {})", .available.join(", "))]
    ConfigurationNotFound { name: String, available: Vec<String> },

    /// The selected entitlement is in a status we have no transition for.
    #[error("entitlement {serial_number} has unhandled status {status}")]
    UnhandledStatus {
        serial_number: String,
        status: String,
    },

    /// A response envelope came back without the expected record.
    #[error("empty response from {0}")]
    EmptyResponse(String),

    /// The final entitlement has no activation token.
    #[error("entitlement {0} has no token")]
    MissingToken(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;

impl From<config::ConfigError> for ProvisionError {
    fn from(e: config::ConfigError) -> Self {
        ProvisionError::ConfigError(e.to_string())
    }
}
