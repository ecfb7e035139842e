use std::path::PathBuf;

use clap::{Parser, Subcommand};

use webhook_relay::config::{loader, validation, RelayConfig};
use webhook_relay::observability::logging;

#[derive(Parser)]
#[command(name = "webhook-relay")]
#[command(about = "Relay webhook events from an event-stream channel to a local target", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Display debug output
    #[arg(long, global = true)]
    debug: bool,

    /// No print color
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay
    Start {
        /// URL of the webhook proxy channel. Required.
        /// For example: https://smee.io/VyOocXe0HCKwlSj
        #[arg(long)]
        url: Option<String>,

        /// Full URL (including protocol and path) of the target service
        /// the events will be forwarded to. Required.
        /// For example: http://jenkins.mycompany.local:8080/github-webhook/
        #[arg(long)]
        target: Option<String>,

        /// Secret to be used for HMAC-SHA1 secure hash verification
        #[arg(long)]
        secret: Option<String>,

        /// Timeout in seconds for the reachability probe and target calls
        #[arg(long)]
        timeout: Option<u64>,

        /// Disable the TLS certificate check, only on the target
        #[arg(long)]
        self_signed_certificate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => loader::load_config_unvalidated(path)?,
        None => RelayConfig::default(),
    };

    let Commands::Start {
        url,
        target,
        secret,
        timeout,
        self_signed_certificate,
    } = cli.command;

    if let Some(url) = url {
        config.source.url = url;
    }
    if let Some(target) = target {
        config.target.url = target;
    }
    if let Some(secret) = secret {
        config.secret = Some(secret);
    }
    if let Some(timeout) = timeout {
        config.timeouts.request_secs = timeout;
    }
    if self_signed_certificate {
        config.target.accept_invalid_certs = true;
    }
    if cli.debug {
        config.observability.log_level = "debug".to_string();
    }

    logging::init_logging(&config.observability.log_level, !cli.no_color);

    if let Err(errors) = validation::validate_config(&config) {
        for error in &errors {
            tracing::error!(%error, "invalid configuration");
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    tracing::info!(
        source = %config.source.url,
        target = %config.target.url,
        timeout_secs = config.timeouts.request_secs,
        "webhook-relay starting"
    );

    if let Err(e) = webhook_relay::relay::run(config).await {
        tracing::error!(error = %e, "relay terminated");
        return Err(e.into());
    }

    Ok(())
}
