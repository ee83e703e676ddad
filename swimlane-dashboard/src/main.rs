//! Swimlane Dashboard
//!
//! Live terminal swimlane chart of the requests reported by a scraping
//! producer over WebSocket.

mod config;
mod dashboard;
mod notifications;
mod renderer;
mod shutdown;

use clap::Parser;
use config::{ConfigLoader, Overrides};
use dashboard::run_dashboard;
use notifications::HtmlDirectorySink;
use renderer::TerminalRenderer;
use shutdown::shutdown_signal;
use std::path::PathBuf;
use swimlane_core::diagnostics::DiagnosticLog;
use swimlane_core::processors::{EventMapper, RenderScheduler, Session};
use swimlane_sdk::client::StreamClient;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Swimlane Dashboard - live request timeline per scraping task
#[derive(Parser, Debug)]
#[command(name = "swimlane-dashboard")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./swimlane.toml")]
    config: PathBuf,

    /// Override the event stream URL (e.g., ws://127.0.0.1:5494/ws)
    #[arg(short, long, env = "SWIMLANE_URL")]
    url: Option<String>,

    /// Override the directory exception details are written to
    #[arg(long)]
    notifications_dir: Option<PathBuf>,

    /// File the dashboard's own logs are written to
    #[arg(long, default_value = "./swimlane-dashboard.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing; the guard flushes the log file on exit
    let _log_guard = init_tracing(&args.log_file)?;

    tracing::info!("Starting swimlane-dashboard v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(
        &args.config,
        Overrides {
            url: args.url,
            notifications_dir: args.notifications_dir,
        },
    );
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let client = StreamClient::new(loaded_config.url)?;

    // Build the session
    let sink = HtmlDirectorySink::open(&loaded_config.notifications_dir).map_err(|e| {
        tracing::error!(
            dir = %loaded_config.notifications_dir.display(),
            "Failed to open exception directory: {}",
            e
        );
        e
    })?;
    let renderer = TerminalRenderer::stdout()?;
    let scheduler = RenderScheduler::new(renderer, loaded_config.chart, loaded_config.scheduler);
    let mut session = Session::new(EventMapper::new(loaded_config.mapper), scheduler, sink)
        .with_diagnostics(DiagnosticLog::with_capacity(
            loaded_config.diagnostics_capacity,
        ));

    // Run until the producer closes the stream or we are told to stop
    let result = run_dashboard(&client, &mut session, shutdown_signal()).await;
    session.sink_mut().flush().await;

    let stats = session.stats();
    tracing::info!(
        messages = stats.messages,
        appended = stats.appended,
        notified = stats.notified,
        ignored = stats.ignored,
        decode_errors = stats.decode_errors,
        classification_errors = stats.classification_errors,
        transport_errors = stats.transport_errors,
        lanes = session.model().lanes().len(),
        frames = session.renderer().frames(),
        exceptions_written = session.sink().written().len(),
        exceptions_dir = %session.sink().dir().display(),
        last_exception = session.sink().written().last().map(|w| w.link.as_str()),
        "Dashboard shutdown complete"
    );

    result.map_err(|e| {
        tracing::error!("Event stream connection failed: {}", e);
        e.into()
    })
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// The chart owns the terminal, so logs are appended to `path` instead.
fn init_tracing(path: &Path) -> std::io::Result<WorkerGuard> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tungstenite=warn,tokio_tungstenite=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    Ok(guard)
}
