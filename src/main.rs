use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

use admin_console_sync::config::Settings;
use admin_console_sync::console::Console;
use admin_console_sync::metrics::encode_metrics;
use admin_console_sync::notice::LogNotices;
use admin_console_sync::telemetry::init_telemetry;
use admin_console_sync::view::{PullOutcome, Section, ViewState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;
    init_telemetry(&settings.telemetry)?;
    tracing::info!(
        api = %settings.api.base_url,
        live = %settings.live.url,
        "Configuration loaded"
    );

    let console = Console::from_settings(settings, Arc::new(LogNotices))?;

    // Nothing starts without admin access
    console.admin_gate().verify().await?;

    report(console.start().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if !handle_command(&console, line.trim()).await {
                        break;
                    }
                }
                Ok(None) => {
                    tracing::debug!("stdin closed, running until signalled");
                    stdin_open = false;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read command");
                    stdin_open = false;
                }
            },
        }
    }

    console.shutdown();
    tracing::info!("Console shutdown complete");
    Ok(())
}

/// Returns false when the operator asked to quit
async fn handle_command(console: &Console, command: &str) -> bool {
    match command {
        "" => {}
        "quit" | "exit" => return false,
        "retry" => report(console.retry().await),
        "status" => print_status(console),
        "metrics" => match encode_metrics() {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::warn!(error = %e, "Failed to encode metrics"),
        },
        other => match other.parse::<Section>() {
            Ok(section) => report(console.show(section).await),
            Err(e) => println!("{} (sections: dashboard, products, orders, customers, inquiries, settings)", e),
        },
    }
    true
}

fn report(outcome: PullOutcome) {
    match outcome {
        PullOutcome::Ready => tracing::info!("Section loaded"),
        PullOutcome::Failed(e) => tracing::warn!(error = %e, "Section failed to load, type `retry`"),
        PullOutcome::Stale => tracing::debug!("Section load superseded"),
        PullOutcome::NotRetryable => println!("Nothing to retry"),
    }
}

fn print_status(console: &Console) {
    let channel = console.connection().snapshot();
    let active = console.sections().active();
    let state = console.sections().controller(active).state();

    println!(
        "channel: {} (reconnects: {})",
        channel.state, channel.reconnect_attempts
    );
    match &state {
        ViewState::Ready(data) => println!("{}: ready, {} rows", active, data.len()),
        ViewState::Error(e) => println!("{}: error: {}", active, e),
        other => println!("{}: {}", active, other.status().as_str()),
    }
    if let Some(pong) = console.router().last_pong() {
        println!("last pong: {}", pong.to_rfc3339());
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down");
        }
    }
}
