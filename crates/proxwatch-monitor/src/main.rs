//! proxwatch binary.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use proxwatch_monitor::{
    init_tracing, metrics, open_devices, Cli, Monitor, MonitorConfig, SystemClock,
};
use proxwatch_notify::SmtpNotifier;

#[tokio::main]
async fn main() -> ExitCode {
    // SMTP over TLS needs a process-wide crypto provider
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider already installed");
    }

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Monitor failed to start: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!("Starting proxwatch");

    let mut config = MonitorConfig::from_env();
    config.apply_cli(&cli)?;
    config.validate()?;
    info!("Monitor config: {:?}", config);

    if let Some(addr) = config.metrics_addr {
        metrics::install_exporter(addr).context("Failed to install metrics exporter")?;
        info!(%addr, "Prometheus exporter listening");
    }

    let notifier = SmtpNotifier::new(config.smtp_config()).context("Failed to configure SMTP")?;
    let devices = open_devices(&config).context("Failed to initialize devices")?;
    let monitor = Monitor::new(&config, devices, Arc::new(notifier), Arc::new(SystemClock))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                shutdown_tx.send(true).ok();
            }
            Err(e) => {
                warn!("Failed to listen for Ctrl-C: {}", e);
                // keep the channel open so the loop keeps running
                shutdown_tx.closed().await;
            }
        }
    });

    monitor.run(shutdown_rx).await;
    Ok(())
}
