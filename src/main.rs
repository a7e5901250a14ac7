// src/main.rs

use clap::Parser;

use flex_provisioner::clipboard;
use flex_provisioner::config::ProvisionerConfig;
use flex_provisioner::credentials::Credentials;
use flex_provisioner::errors::ProvisionResult;
use flex_provisioner::logging::init_logging;
use flex_provisioner::provisioner::{run, ConfigName};

#[derive(Parser, Debug)]
#[command(name = "flex-provisioner", version, about = "Flex Provisioner", long_about = None)]
struct Cli {
    /// Name of the configuration to use
    #[arg(value_enum)]
    config_name: ConfigName,
}

/// Provision one entitlement for the named configuration and print its token.
///
/// Only the token goes to stdout; logs and errors go to stderr.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    #[cfg(all(feature = "clipboard", target_os = "linux"))]
    if let Some(held) = clipboard::serve_holder() {
        if let Err(e) = held {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let cli = Cli::parse();

    if let Err(e) = provision(cli.config_name).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn provision(config_name: ConfigName) -> ProvisionResult<()> {
    let config = ProvisionerConfig::load()?;
    init_logging(&config.logging);

    let credentials = Credentials::load(&config.credentials)?;
    let mut clipboard = clipboard::from_config(&config.output);

    let outcome = run(&config, &credentials, config_name, clipboard.as_mut()).await?;
    println!("{}", outcome.token);

    tracing::info!(
        serial_number = %outcome.serial_number,
        action = ?outcome.action,
        copied = outcome.copied,
        "Provisioning complete"
    );
    Ok(())
}
