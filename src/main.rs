//! Admin CLI
//!
//! Provisions a user in the configured backing store, outside the broker:
//! generates a salt, hashes the password, and writes the credential and
//! topic filter.

use anyhow::{bail, Result};
use clap::Parser;
use mqtt_auth_plugin::config::PluginConfig;
use mqtt_auth_plugin::{admin, store};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Provision MQTT broker auth users
#[derive(Parser, Debug)]
#[command(name = "mqtt-auth-admin")]
#[command(version)]
#[command(about = "Set a user's password and allowed topic filter in the auth store", long_about = None)]
struct Args {
    /// Username to create or update
    username: String,

    /// Plaintext password to salt and hash
    password: String,

    /// Topic filter the user may access, e.g. '/foo/#'
    topic_filter: String,

    /// Configuration file path (JSON)
    #[arg(short, long, conflicts_with = "broker_conf")]
    config: Option<PathBuf>,

    /// Broker config file to read auth_opt_ lines from
    #[arg(long)]
    broker_conf: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable JSON log format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let config = if let Some(path) = &args.config {
        info!(path = %path.display(), "loading configuration file");
        PluginConfig::from_json_file(path)?
    } else if let Some(path) = &args.broker_conf {
        info!(path = %path.display(), "reading broker configuration");
        PluginConfig::from_conf_file(path)?
    } else {
        bail!("either --config or --broker-conf is required");
    };

    let store = store::connect(&config.backend).await?;
    admin::provision_user(
        store.as_ref(),
        &args.username,
        &args.password,
        &args.topic_filter,
    )
    .await?;

    Ok(())
}
