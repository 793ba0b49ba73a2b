//! Netfetch Binary Entry Point
//!
//! Loads the YAML configuration, wires the SNMP connector and the sink chain,
//! and runs polling cycles until Ctrl+C or SIGTERM.

use std::path::PathBuf;

use clap::Parser;
use netfetch::{AppConfig, Scheduler};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, reload, util::SubscriberInitExt};

/// Netfetch - SNMP network telemetry collector
#[derive(Parser, Debug)]
#[command(name = "netfetch", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "configs/netfetch.yaml",
        env = "NETFETCH_CONFIG"
    )]
    config: PathBuf,

    /// Extra host file or directory (overrides `hosts_path` in the config file)
    #[arg(long, env = "NETFETCH_HOSTS")]
    hosts: Option<PathBuf>,

    /// Force debug verbosity
    #[arg(long, env = "NETFETCH_DEBUG")]
    debug: bool,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

fn level_filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            "debug".into()
        } else {
            "info".into()
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing; the filter is revisited once the config file is read
    let (filter, filter_handle) = reload::Layer::new(level_filter(cli.debug));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Netfetch - SNMP network telemetry collector");

    tracing::info!(path = %cli.config.display(), "Loading configuration");
    let mut config = AppConfig::load_with_hosts_path(&cli.config, cli.hosts.as_deref())?;

    // CLI/env override the config file
    if cli.debug {
        config.general.debug = true;
    }
    if config.general.debug && !cli.debug {
        filter_handle.reload(level_filter(true))?;
    }

    tracing::info!(
        hosts = config.hosts.len(),
        interval = %humantime::format_duration(config.general.interval),
        timeout = %humantime::format_duration(config.general.timeout),
        max_tasks = config.general.max_tasks,
        influx = config.sink.influx.as_ref().map(|i| i.url.as_str()).unwrap_or("none"),
        fallback_dir = %config.sink.fallback_dir.display(),
        "Configuration loaded"
    );

    let scheduler = Scheduler::from_config(&config)?;

    if cli.once {
        let report = scheduler.run_cycle(1).await;
        tracing::info!(report = ?report, "Single cycle complete");
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    tracing::info!("Press Ctrl+C to shutdown");
    scheduler.run(shutdown).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Cancel `shutdown` on Ctrl+C or SIGTERM.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }

    tracing::info!("Finishing the current cycle before exit...");
    shutdown.cancel();
}
