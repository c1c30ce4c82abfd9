//! Alt-Track HTTP gateway
//!
//! Boots the Audit-Logged Valuation Store from disk (latest snapshot
//! plus journal tail), then serves the `/v1` asset-tracking API. On
//! shutdown the journal is flushed and a fresh snapshot written so the
//! next boot replays as little as possible.

mod error;
mod handlers;
mod models;
mod rate_limit;
mod router;
mod state;
mod tenant;

use ledger::journal::JournalConfig;
use ledger::recovery::recover_store;
use ledger::snapshot::{SnapshotConfig, SnapshotWriter};
use router::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("Starting Alt-Track gateway");

    let data_dir = PathBuf::from(
        std::env::var("ALTTRACK_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
    );
    let journal_dir = data_dir.join("journal");
    let snapshot_dir = data_dir.join("snapshots");

    // Rebuild state from the latest snapshot plus the journal tail.
    let (store, metrics) = recover_store(&snapshot_dir, JournalConfig::new(&journal_dir))?;
    tracing::info!(
        sequence = metrics.final_sequence,
        replayed = metrics.replay_count,
        elapsed_ms = metrics.total_recovery_time_ms,
        state_hash = %metrics.final_state_hash,
        "Ledger recovered"
    );

    let state = AppState::new(store);
    let app = create_router(state.clone());

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush the journal and leave a snapshot behind.
    let mut store = state.store.write().await;
    store.sync()?;
    let path = SnapshotWriter::new(SnapshotConfig::new(&snapshot_dir))
        .write_state(store.state(), state::now_nanos())?;
    tracing::info!(path = %path.display(), "Shutdown snapshot written");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
