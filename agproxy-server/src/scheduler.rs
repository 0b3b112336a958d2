//! Background Schedulers
//!
//! Interval-driven maintenance over the core services:
//!
//! - Snapshot tick (60 s): flush dirty event and account state to disk
//! - Prune tick (60 s): apply the event retention policy
//! - Issue sweep: aggregate the health matrix into incidents, interval
//!   taken from `quotaPollIntervalMs` each round
//!
//! Missing a tick is acceptable; every task re-reads config where relevant
//! and shuts down on the shared watch signal.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Snapshot and prune cadence.
const MAINTENANCE_INTERVAL_SECS: u64 = 60;

/// Spawn all maintenance tasks; send `true` on the returned channel to stop
/// them.
pub fn start(state: &AppState) -> (watch::Sender<bool>, Vec<JoinHandle<()>>) {
    let (shutdown_tx, _) = watch::channel(false);

    let handles = vec![
        spawn_snapshot_task(state.clone(), shutdown_tx.subscribe()),
        spawn_prune_task(state.clone(), shutdown_tx.subscribe()),
        spawn_sweep_task(state.clone(), shutdown_tx.subscribe()),
    ];

    (shutdown_tx, handles)
}

fn spawn_snapshot_task(
    state: AppState,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_secs(MAINTENANCE_INTERVAL_SECS)) => {
                    state.flush();
                }
                _ = shutdown_rx.changed() => {
                    tracing::info!("Snapshot task shutting down");
                    break;
                }
            }
        }
    })
}

fn spawn_prune_task(state: AppState, mut shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = tokio::time::sleep(Duration::from_secs(MAINTENANCE_INTERVAL_SECS)) => {
                    state.events().prune();
                }
                _ = shutdown_rx.changed() => {
                    tracing::info!("Prune task shutting down");
                    break;
                }
            }
        }
    })
}

fn spawn_sweep_task(state: AppState, mut shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let interval_ms = state.config().get().quota_poll_interval_ms;
            tokio::select! {
                () = tokio::time::sleep(Duration::from_millis(interval_ms)) => {
                    let models = state.registry().tracked_model_ids();
                    let matrix = state.tracker().build_health_matrix(&models);
                    state.issues().sweep(&matrix);
                }
                _ = shutdown_rx.changed() => {
                    tracing::info!("Issue sweep task shutting down");
                    break;
                }
            }
        }
    })
}
