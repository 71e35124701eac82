use std::future::IntoFuture;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskhub::{config::ServerConfig, hub::Hub, routes, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskhub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting taskhub...");

    let config = ServerConfig::from_env();

    // One hub per process, shared by the WebSocket endpoint and the task API
    let hub = Arc::new(Hub::new(config.hub.clone()));
    let state = Arc::new(AppState::new(hub.clone()));
    let app = routes::build_router(state, &config);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on http://{}", addr);

    let stop = Arc::new(Notify::new());
    let server = {
        let stop = stop.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { stop.notified().await })
            .into_future()
    };
    let mut server = tokio::spawn(server);

    tokio::select! {
        result = &mut server => {
            tracing::error!(?result, "Server stopped unexpectedly");
            std::process::exit(1);
        }
        _ = shutdown_signal() => {}
    }

    tracing::info!("Shutting down server...");

    // Close sockets first so upgraded connections don't hold the drain open
    hub.shutdown().await;
    stop.notify_one();

    match tokio::time::timeout(config.shutdown_timeout, server).await {
        Ok(Ok(Ok(()))) => tracing::info!("Server exited gracefully"),
        Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server error during shutdown"),
        Ok(Err(e)) => tracing::error!(error = %e, "Server task failed"),
        Err(_) => tracing::warn!(
            timeout = ?config.shutdown_timeout,
            "Server forced to shut down"
        ),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
