//! Rally segmentation worker binary.
//!
//! Usage: `rallycut-worker <video>`. Prints the analysis as JSON on stdout.

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rallycut_worker::{run_analysis, WorkerConfig, WorkerError};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "rallycut=info".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    // Logs go to stderr so stdout carries only the report
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting rallycut-worker");

    if let Err(e) = run().await {
        error!("Worker error: {}", e);
        std::process::exit(e.exit_code());
    }

    info!("Worker shutdown complete");
}

async fn run() -> Result<(), WorkerError> {
    let config = WorkerConfig::from_env()?;
    info!("Worker config: {:?}", config);

    let video = std::env::args()
        .nth(1)
        .ok_or_else(|| WorkerError::invalid_argument("usage: rallycut-worker <video>"))?;

    // Ctrl-C requests cooperative cancellation
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let signal_handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal, cancelling analysis");
            let _ = cancel_tx.send(true);
        }
    });

    let result = run_analysis(&video, &config, Some(cancel_rx)).await;
    signal_handle.abort();
    let output = result?;

    let json = if config.pretty_output {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);

    Ok(())
}
