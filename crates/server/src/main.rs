mod agreements;
mod bootstrap;
mod health;
mod quotes;

use std::future::{Future, IntoFuture};
use std::time::Duration;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::oneshot;
use vaulted_core::config::{AppConfig, LoadOptions};

use crate::quotes::AppState;

fn init_logging(config: &AppConfig) {
    use tracing::Level;
    use vaulted_core::config::LogFormat::*;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

fn router(state: AppState, db_pool: vaulted_db::DbPool) -> Router {
    Router::new()
        .route("/api/quotes", post(quotes::create_quote))
        .route("/api/quotes/{session_id}", get(quotes::get_quote))
        .route("/api/agreements", post(agreements::create_agreement))
        .route("/api/agreements/webhook", post(agreements::webhook))
        .with_state(state)
        .merge(health::router(db_pool))
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        graceful_shutdown_secs = app.config.server.graceful_shutdown_secs,
        "vaulted intake api started"
    );

    let drain_deadline = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    let (signal_tx, signal_rx) = oneshot::channel();
    let server = axum::serve(listener, router(app.state, app.db_pool))
        .with_graceful_shutdown(async move {
            wait_for_shutdown().await;
            let _ = signal_tx.send(());
        });

    serve_until_drained(server.into_future(), signal_rx, drain_deadline).await?;

    tracing::info!(event_name = "system.server.stopped", "vaulted intake api stopped");
    Ok(())
}

/// Runs the server to completion, but once the shutdown signal has fired,
/// open connections get at most `drain_deadline` to finish.
async fn serve_until_drained<S>(
    server: S,
    signal_rx: oneshot::Receiver<()>,
    drain_deadline: Duration,
) -> std::io::Result<()>
where
    S: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(server);
    tokio::select! {
        result = &mut server => result,
        _ = async move {
            let _ = signal_rx.await;
            tokio::time::sleep(drain_deadline).await;
        } => {
            tracing::warn!(
                event_name = "system.server.drain_deadline",
                drain_secs = drain_deadline.as_secs(),
                "open connections did not drain before the deadline, stopping anyway"
            );
            Ok(())
        }
    }
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(
            event_name = "system.server.signal_error",
            error = %error,
            "failed to listen for shutdown signal"
        );
    }
    tracing::info!(event_name = "system.server.stopping", "shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::serve_until_drained;

    #[tokio::test]
    async fn drain_deadline_stops_a_stuck_server() {
        let (signal_tx, signal_rx) = oneshot::channel();
        signal_tx.send(()).expect("signal");

        let stuck = std::future::pending::<std::io::Result<()>>();
        serve_until_drained(stuck, signal_rx, Duration::from_millis(20))
            .await
            .expect("deadline path returns cleanly");
    }

    #[tokio::test]
    async fn drained_server_finishes_before_the_deadline() {
        let (signal_tx, signal_rx) = oneshot::channel();
        signal_tx.send(()).expect("signal");

        let drained = std::future::ready(Ok(()));
        serve_until_drained(drained, signal_rx, Duration::from_secs(30))
            .await
            .expect("server result wins");
    }
}
