use anyhow::{Context, Result};
use aruba_subnet_plugin::aruba::client::ArubaClient;
use aruba_subnet_plugin::build_router;
use aruba_subnet_plugin::config::Config;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Flattened REST adapter for Aruba Cloud subnets
#[derive(Parser, Debug)]
#[command(name = "aruba-subnet-plugin", version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "ARUBA_PLUGIN_LISTEN_ADDR")]
    listen: Option<String>,

    /// Aruba Cloud API base URL
    #[arg(long, env = "ARUBA_PLUGIN_UPSTREAM_URL")]
    upstream_url: Option<String>,

    /// Timeout in seconds for one upstream call (none by default)
    #[arg(long, env = "ARUBA_PLUGIN_UPSTREAM_TIMEOUT")]
    upstream_timeout: Option<u64>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, env = "ARUBA_PLUGIN_CONFIG")]
    config: Option<PathBuf>,

    /// Persist the effective settings to the configuration file
    #[arg(long)]
    save_config: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info", env = "ARUBA_PLUGIN_LOG_LEVEL")]
    log_level: LogLevel,

    /// Write logs to this file instead of stdout
    #[arg(long, env = "ARUBA_PLUGIN_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let Some(log_path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
        return Ok(None);
    };

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_ref())?;

    let config_path = args.config.clone().or_else(Config::config_path);
    let config = config_path
        .as_deref()
        .map(Config::load_from)
        .unwrap_or_default();

    let listen_addr = config.effective_listen_addr(args.listen.as_deref());
    let base_url = config.effective_base_url(args.upstream_url.as_deref());
    let timeout = config.effective_timeout(args.upstream_timeout);

    if args.save_config {
        if let Some(path) = config_path.as_deref() {
            let effective = Config {
                listen_addr: Some(listen_addr.clone()),
                upstream_base_url: Some(base_url.clone()),
                upstream_timeout_secs: timeout.map(|t| t.as_secs()),
            };
            effective.save_to(path)?;
            tracing::info!("Saved configuration to {:?}", path);
        }
    }

    tracing::info!(
        "aruba-subnet-plugin v{} forwarding to {}",
        env!("CARGO_PKG_VERSION"),
        base_url
    );

    let client = ArubaClient::new(&base_url, timeout)?;
    let app = build_router(client);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", listen_addr))?;
    tracing::info!("Listening on {}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down");
        },
    }
}
