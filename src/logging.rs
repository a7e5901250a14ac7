//! Logging setup and entitlement event logging.
//!
//! Logs always go to stderr so that stdout carries nothing but the token.
//! `RUST_LOG` takes precedence over `logging.level` when set.

use tracing::{info, info_span};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global `tracing` subscriber.
///
/// Does nothing when logging is disabled or a subscriber is already set.
pub fn init_logging(config: &LoggingConfig) {
    if !config.enabled {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Entitlement state change event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementEvent {
    /// Picked as the entitlement to bring back into use
    Selected,
    /// STOPPED entitlement reactivated
    Reactivated,
    /// PENDING entitlement token regenerated
    Regenerated,
    /// New entitlement created
    Created,
    /// Returned without a transition
    Unchanged,
}

impl std::fmt::Display for EntitlementEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntitlementEvent::Selected => "selected",
            EntitlementEvent::Reactivated => "reactivated",
            EntitlementEvent::Regenerated => "regenerated",
            EntitlementEvent::Created => "created",
            EntitlementEvent::Unchanged => "unchanged",
        };
        write!(f, "{}", s)
    }
}

/// Log an entitlement state change event.
///
/// # Arguments
///
/// * `event` - The type of entitlement event
/// * `serial_number` - The entitlement serial number
/// * `details` - Optional additional details about the event
pub fn log_entitlement_event(event: EntitlementEvent, serial_number: &str, details: Option<&str>) {
    let span = info_span!(
        "entitlement_event",
        event = %event,
        serial_number = %serial_number,
    );
    let _enter = span.enter();

    if let Some(d) = details {
        info!(details = %d, "Entitlement event occurred");
    } else {
        info!("Entitlement event occurred");
    }
}
