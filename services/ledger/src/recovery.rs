//! Recovery Flow — Boot from snapshot + journal replay
//!
//! Recovery process:
//! 1. Find the latest valid snapshot (if any)
//! 2. Load snapshot → ledger state
//! 3. Open journal reader, seek to snapshot.sequence + 1
//! 4. Replay all subsequent events through `LedgerState::apply`
//! 5. Enforce gapless sequence continuity while replaying
//!
//! Because the live command path and replay share the same apply
//! function, a recovered store is exactly the store that went down.

use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

use crate::events::LedgerEvent;
use crate::journal::{JournalConfig, JournalError, JournalWriter};
use crate::reader::{JournalReader, ReaderError};
use crate::snapshot::{state_hash, SnapshotError, SnapshotLoader};
use crate::store::{LedgerState, LedgerStore};

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("Sequence gap during replay: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },

    #[error("Recovery failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ── Recovery Metrics ────────────────────────────────────────────────

/// Metrics collected during the recovery process.
#[derive(Debug, Clone)]
pub struct RecoveryMetrics {
    /// Time to load the snapshot (if any).
    pub snapshot_load_time_ms: u64,
    /// Sequence number of the loaded snapshot (0 if none).
    pub snapshot_sequence: u64,
    /// Number of journal entries replayed.
    pub replay_count: u64,
    /// Time spent replaying journal entries.
    pub replay_time_ms: u64,
    /// Total recovery time (snapshot load + replay).
    pub total_recovery_time_ms: u64,
    /// Final state hash after recovery.
    pub final_state_hash: String,
    /// Final sequence number after recovery.
    pub final_sequence: u64,
}

impl RecoveryMetrics {
    fn new() -> Self {
        Self {
            snapshot_load_time_ms: 0,
            snapshot_sequence: 0,
            replay_count: 0,
            replay_time_ms: 0,
            total_recovery_time_ms: 0,
            final_state_hash: String::new(),
            final_sequence: 0,
        }
    }
}

// ── Recovery Engine ─────────────────────────────────────────────────

/// Orchestrates snapshot loading + journal replay.
pub struct RecoveryEngine {
    snapshot_dir: PathBuf,
    journal_dir: PathBuf,
}

impl RecoveryEngine {
    /// Create a new recovery engine.
    pub fn new(snapshot_dir: impl Into<PathBuf>, journal_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_dir: snapshot_dir.into(),
            journal_dir: journal_dir.into(),
        }
    }

    /// Execute full recovery: snapshot load + journal replay.
    pub fn recover(&self) -> Result<(LedgerState, RecoveryMetrics), RecoveryError> {
        let total_start = Instant::now();
        let mut metrics = RecoveryMetrics::new();

        // Step 1: Load the latest valid snapshot, if any.
        let snapshot_start = Instant::now();
        let mut state = match SnapshotLoader::new(&self.snapshot_dir).load_latest() {
            Ok(snapshot) => {
                metrics.snapshot_sequence = snapshot.sequence;
                snapshot.state
            }
            Err(SnapshotError::NoSnapshots) => LedgerState::empty(),
            Err(e) => return Err(e.into()),
        };
        metrics.snapshot_load_time_ms = snapshot_start.elapsed().as_millis() as u64;

        // Step 2: Open the journal and seek past the snapshot.
        let mut reader = JournalReader::open(&self.journal_dir)?;
        if metrics.snapshot_sequence > 0 {
            reader.seek_to_sequence(metrics.snapshot_sequence + 1)?;
        }

        // Step 3: Replay the journal tail.
        let replay_start = Instant::now();
        while let Some(entry) = reader.next_entry()? {
            let expected = state.last_sequence + 1;
            if entry.sequence != expected {
                return Err(RecoveryError::SequenceGap {
                    expected,
                    got: entry.sequence,
                });
            }

            let event = LedgerEvent::decode(&entry.payload).map_err(|e| {
                RecoveryError::Failed(format!(
                    "undecodable event at seq {}: {}",
                    entry.sequence, e
                ))
            })?;
            state.apply(&event).map_err(|e| {
                RecoveryError::Failed(format!("apply failed at seq {}: {}", entry.sequence, e))
            })?;
            state.last_sequence = entry.sequence;
            metrics.replay_count += 1;
        }
        metrics.replay_time_ms = replay_start.elapsed().as_millis() as u64;

        metrics.final_sequence = state.last_sequence;
        metrics.final_state_hash = state_hash(&state);
        metrics.total_recovery_time_ms = total_start.elapsed().as_millis() as u64;

        Ok((state, metrics))
    }
}

/// Recover a durable store: replayed state plus a journal writer
/// positioned at the next sequence.
pub fn recover_store(
    snapshot_dir: impl Into<PathBuf>,
    journal_config: JournalConfig,
) -> Result<(LedgerStore, RecoveryMetrics), RecoveryError> {
    let engine = RecoveryEngine::new(snapshot_dir, journal_config.dir.clone());
    let (state, metrics) = engine.recover()?;

    let mut journal = JournalWriter::open(journal_config)?;
    journal.set_next_sequence(state.last_sequence + 1);

    Ok((LedgerStore::from_parts(state, Some(journal)), metrics))
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{SnapshotConfig, SnapshotWriter};
    use crate::store::{NewAsset, UpdateAsset};
    use std::fs;
    use tempfile::TempDir;
    use types::ids::TenantId;
    use types::money::Money;

    const T0: i64 = 1_708_123_456_789_000_000;

    struct Dirs {
        _tmp: TempDir,
        journal: PathBuf,
        snapshots: PathBuf,
    }

    fn dirs() -> Dirs {
        let tmp = TempDir::new().unwrap();
        let journal = tmp.path().join("journal");
        let snapshots = tmp.path().join("snapshots");
        Dirs {
            _tmp: tmp,
            journal,
            snapshots,
        }
    }

    fn seed_store(journal_dir: &PathBuf) -> (LedgerState, TenantId) {
        let journal = JournalWriter::open(JournalConfig::new(journal_dir)).unwrap();
        let mut store = LedgerStore::with_journal(journal);

        let tenant = TenantId::new();
        store.register_tenant(tenant, T0).unwrap();
        let asset = store
            .create_asset(
                tenant,
                NewAsset {
                    name: "Rental Property Fund".to_string(),
                    category_id: None,
                    purchase_price: Money::from_u64(10_000),
                    purchase_date: T0,
                },
                T0,
            )
            .unwrap();
        for (i, value) in [11_000u64, 12_500, 13_500].iter().enumerate() {
            store
                .update_asset(
                    tenant,
                    asset.asset_id,
                    UpdateAsset {
                        name: asset.name.clone(),
                        category_id: None,
                        current_value: Money::from_u64(*value),
                        note: Some(format!("Update {}", i)),
                    },
                    T0 + (i as i64 + 1) * 1_000,
                )
                .unwrap();
        }
        store.sync().unwrap();
        (store.state().clone(), tenant)
    }

    #[test]
    fn test_replay_without_snapshot() {
        let d = dirs();
        let (original, _) = seed_store(&d.journal);

        let engine = RecoveryEngine::new(&d.snapshots, &d.journal);
        let (recovered, metrics) = engine.recover().unwrap();

        assert_eq!(recovered, original);
        assert_eq!(metrics.snapshot_sequence, 0);
        assert_eq!(metrics.replay_count, 5);
        assert_eq!(metrics.final_sequence, original.last_sequence);
        assert_eq!(metrics.final_state_hash, state_hash(&original));
    }

    #[test]
    fn test_snapshot_plus_tail_replay() {
        let d = dirs();

        // Build a store, snapshot mid-way, then keep writing.
        let journal = JournalWriter::open(JournalConfig::new(&d.journal)).unwrap();
        let mut store = LedgerStore::with_journal(journal);
        let tenant = TenantId::new();
        store.register_tenant(tenant, T0).unwrap();
        let asset = store
            .create_asset(
                tenant,
                NewAsset {
                    name: "Charizard 1st Edition (Raw)".to_string(),
                    category_id: None,
                    purchase_price: Money::from_u64(2_000),
                    purchase_date: T0,
                },
                T0,
            )
            .unwrap();

        let writer = SnapshotWriter::new(SnapshotConfig::new(&d.snapshots));
        writer.write_state(store.state(), T0 + 1).unwrap();
        let snapshot_seq = store.last_sequence();

        store
            .archive_asset(
                tenant,
                asset.asset_id,
                Some("Determined to be Counterfeit".to_string()),
                T0 + 2,
            )
            .unwrap();
        store.sync().unwrap();
        let original = store.state().clone();
        drop(store);

        let engine = RecoveryEngine::new(&d.snapshots, &d.journal);
        let (recovered, metrics) = engine.recover().unwrap();

        assert_eq!(recovered, original);
        assert_eq!(metrics.snapshot_sequence, snapshot_seq);
        assert_eq!(metrics.replay_count, 1, "only the archive event replayed");
    }

    #[test]
    fn test_recover_store_continues_sequencing() {
        let d = dirs();
        let (original, tenant) = seed_store(&d.journal);

        let (mut store, _) =
            recover_store(&d.snapshots, JournalConfig::new(&d.journal)).unwrap();
        assert_eq!(store.last_sequence(), original.last_sequence);

        // New writes pick up the next sequence without gaps.
        store
            .create_asset(
                tenant,
                NewAsset {
                    name: "Series B Startup Shares".to_string(),
                    category_id: None,
                    purchase_price: Money::from_u64(50_000),
                    purchase_date: T0,
                },
                T0 + 10_000,
            )
            .unwrap();
        assert_eq!(store.last_sequence(), original.last_sequence + 1);
        store.sync().unwrap();
        drop(store);

        // And the extended journal still replays cleanly.
        let engine = RecoveryEngine::new(&d.snapshots, &d.journal);
        let (recovered, metrics) = engine.recover().unwrap();
        assert_eq!(metrics.final_sequence, original.last_sequence + 1);
        assert_eq!(recovered.last_sequence, original.last_sequence + 1);
    }

    #[test]
    fn test_truncated_tail_recovers_prefix() {
        let d = dirs();
        let (original, _) = seed_store(&d.journal);

        // Chop bytes off the journal tail to simulate a torn write.
        let mut files: Vec<_> = fs::read_dir(&d.journal)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        files.sort();
        let last = files.last().unwrap();
        let data = fs::read(last).unwrap();
        fs::write(last, &data[..data.len() - 7]).unwrap();

        let engine = RecoveryEngine::new(&d.snapshots, &d.journal);
        let (recovered, metrics) = engine.recover().unwrap();

        assert_eq!(metrics.replay_count, 4, "torn final event dropped");
        assert_eq!(recovered.last_sequence, original.last_sequence - 1);
    }

    #[test]
    fn test_empty_dirs_yield_empty_store() {
        let d = dirs();
        let engine = RecoveryEngine::new(&d.snapshots, &d.journal);
        let (recovered, metrics) = engine.recover().unwrap();

        assert_eq!(recovered, LedgerState::empty());
        assert_eq!(metrics.replay_count, 0);
        assert_eq!(metrics.final_sequence, 0);
    }
}
