//! flex-provisioner - provision FortiFlex VM entitlements and emit the activation token
//!
//! A run authenticates against the Fortinet customer auth endpoint, resolves a
//! named configuration to its FortiFlex configuration id, then either
//! reactivates/regenerates the first STOPPED or PENDING entitlement of that
//! configuration or creates a new one.
//!
//! # Features
//!
//! - `clipboard` - Copy the token to the system clipboard (via `arboard`).
//!   Enabled by default; still requires `output.clipboard: true` at runtime.
//!
//! # Example
//!
//! ```rust,no_run
//! use flex_provisioner::clipboard::NoClipboard;
//! use flex_provisioner::config::ProvisionerConfig;
//! use flex_provisioner::credentials::Credentials;
//! use flex_provisioner::provisioner::{run, ConfigName};
//!
//! # async fn demo() -> flex_provisioner::errors::ProvisionResult<()> {
//! let config = ProvisionerConfig::load()?;
//! let credentials = Credentials::load(&config.credentials)?;
//! let outcome = run(&config, &credentials, ConfigName::Fortigate, &mut NoClipboard).await?;
//! println!("{}", outcome.token);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod clipboard;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod logging;
pub mod provisioner;
pub mod selection;
