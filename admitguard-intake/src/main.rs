//! admitguard-intake - Candidate intake client
//!
//! Headless entry point: resolves configuration, constructs a form
//! session against the remote service and probes connectivity. The
//! interactive surface subscribes to the session's event bus; running the
//! binary directly is a connectivity/configuration check.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use admitguard_common::config::ServiceConfig;
use admitguard_intake::client::AuditClient;
use admitguard_intake::IntakeSession;

#[derive(Parser, Debug)]
#[command(name = "admitguard-intake", about = "AdmitGuard candidate intake client")]
struct Args {
    /// Base URL of the AdmitGuard service
    #[arg(long, env = "ADMITGUARD_API_URL")]
    api_url: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting admitguard-intake client");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = ServiceConfig::resolve(args.api_url.as_deref());
    info!("Service: {}", config.base_url);

    let session = IntakeSession::connect(&config)
        .map_err(|e| anyhow::anyhow!("Failed to construct session: {}", e))?;
    info!("Form session ready (all fields unvalidated)");

    // Connectivity probe: the dashboard endpoint is cheap and needs no
    // session state
    let audit_client = AuditClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to construct audit client: {}", e))?;
    match audit_client.dashboard().await {
        Ok(stats) => {
            info!(
                total_submissions = stats.total_submissions,
                flagged_count = stats.flagged_count,
                exception_rate = stats.exception_rate,
                "Service reachable"
            );
        }
        Err(e) => {
            warn!(error = %e, "Service unreachable — sessions will surface retry toasts");
        }
    }

    drop(session);
    Ok(())
}
