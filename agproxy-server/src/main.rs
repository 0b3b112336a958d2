//! Antigravity Proxy - Headless Daemon
//!
//! A pure Rust HTTP server that owns the routing and reliability core of the
//! multi-account proxy:
//!
//! - Tracks per-(account, model) health and applies auto-disable/recovery
//! - Records a structured event stream with live SSE fan-out
//! - Rolls events into operator incidents
//! - Provides the REST API for the dashboard on /api/*
//!
//! The schema translation and upstream transport layers run as separate
//! collaborators that pick accounts through this process.

use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod api;
mod scheduler;
mod state;

#[cfg(test)]
mod test_helpers;

use state::AppState;

const DEFAULT_PORT: u16 = 8046;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let port: u16 = std::env::var("AGPROXY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let data_dir = agproxy_core::paths::resolve_data_dir()
        .map_err(|e| anyhow::anyhow!("Failed to resolve data directory: {e}"))?;
    info!("Data directory: {}", data_dir.display());

    let state = AppState::new(data_dir);
    info!("{} accounts loaded", state.registry().len());
    info!("{} events restored", state.events().count());

    state
        .events()
        .record_system("Proxy server started".to_string(), serde_json::Value::Null);

    let (scheduler_shutdown, scheduler_handles) = scheduler::start(&state);

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{addr}");
    info!("API available at http://localhost:{port}/api/");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the maintenance tasks, then take a final snapshot
    let _ = scheduler_shutdown.send(true);
    for handle in scheduler_handles {
        let _ = handle.await;
    }

    info!("Flushing state before exit");
    state.flush();

    Ok(())
}

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve on SIGINT or SIGTERM so the snapshot flush always runs.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
