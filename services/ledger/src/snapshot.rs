//! Snapshot System — State snapshots with integrity and compression
//!
//! Periodic full-state snapshots bound recovery time: boot loads the
//! latest valid snapshot and replays only the journal tail after it.
//!
//! Features:
//! - Full ledger state serialization (all tenants' books)
//! - SHA-256 integrity hash over serialized state
//! - Optional zstd compression
//! - Snapshot versioning for forward compatibility
//! - Cleanup policy (keep last N snapshots)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::store::LedgerState;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Integrity check failed: expected {expected}, got {actual}")]
    IntegrityFailure { expected: String, actual: String },

    #[error("Unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),

    #[error("No snapshots found")]
    NoSnapshots,
}

// ── State Hash ──────────────────────────────────────────────────────

/// Compute a deterministic SHA-256 hash of the state.
///
/// BTreeMap-backed state serializes in key order, so equal states always
/// hash identically.
pub fn state_hash(state: &LedgerState) -> String {
    let bytes = bincode::serialize(state).expect("LedgerState serialization should never fail");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    format!("{:x}", hasher.finalize())
}

// ── Snapshot ────────────────────────────────────────────────────────

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A complete snapshot of the ledger state at a given sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version for forward compatibility.
    pub version: u32,
    /// Last applied event sequence number.
    pub sequence: u64,
    /// Unix nanosecond timestamp when snapshot was taken.
    pub timestamp: i64,
    /// Full ledger state.
    pub state: LedgerState,
    /// SHA-256 hash of the serialized state.
    pub checksum: String,
    /// Whether the data on disk is zstd-compressed.
    pub compressed: bool,
}

impl Snapshot {
    /// Create a new snapshot with computed integrity hash.
    pub fn new(sequence: u64, timestamp: i64, state: LedgerState, compressed: bool) -> Self {
        let checksum = state_hash(&state);
        Self {
            version: SNAPSHOT_VERSION,
            sequence,
            timestamp,
            state,
            checksum,
            compressed,
        }
    }

    /// Verify the snapshot's integrity hash.
    pub fn verify_integrity(&self) -> bool {
        self.checksum == state_hash(&self.state)
    }
}

// ── Snapshot Writer ─────────────────────────────────────────────────

/// Configuration for snapshot writing.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Directory for snapshot files.
    pub dir: PathBuf,
    /// Whether to zstd-compress snapshots on disk.
    pub compress: bool,
    /// How many snapshots to retain (0 = unlimited).
    pub keep_last: usize,
}

impl SnapshotConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            compress: true,
            keep_last: 3,
        }
    }
}

/// Writes snapshots and enforces the retention policy.
pub struct SnapshotWriter {
    config: SnapshotConfig,
}

impl SnapshotWriter {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    /// Take a snapshot of the given state and persist it.
    pub fn write_state(
        &self,
        state: &LedgerState,
        timestamp: i64,
    ) -> Result<PathBuf, SnapshotError> {
        let snapshot = Snapshot::new(
            state.last_sequence,
            timestamp,
            state.clone(),
            self.config.compress,
        );
        self.write(&snapshot)
    }

    /// Persist an already-built snapshot. Returns the file path.
    pub fn write(&self, snapshot: &Snapshot) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(&self.config.dir)?;

        let encoded = bincode::serialize(snapshot)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        let bytes = if snapshot.compressed {
            zstd::stream::encode_all(&encoded[..], 3)?
        } else {
            encoded
        };

        let path = snapshot_path(&self.config.dir, snapshot.sequence, snapshot.compressed);
        fs::write(&path, bytes)?;

        self.cleanup()?;
        Ok(path)
    }

    /// Delete snapshots beyond the retention count, oldest first.
    fn cleanup(&self) -> Result<(), SnapshotError> {
        if self.config.keep_last == 0 {
            return Ok(());
        }
        let mut files = discover_snapshots(&self.config.dir)?;
        while files.len() > self.config.keep_last {
            let (_, path) = files.remove(0);
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Snapshot Loader ─────────────────────────────────────────────────

/// Loads and validates snapshots.
pub struct SnapshotLoader {
    dir: PathBuf,
}

impl SnapshotLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// List available snapshot files, oldest first.
    pub fn list(&self) -> Result<Vec<PathBuf>, SnapshotError> {
        Ok(discover_snapshots(&self.dir)?
            .into_iter()
            .map(|(_, p)| p)
            .collect())
    }

    /// Load the newest snapshot that decodes and passes its integrity
    /// check, skipping over damaged files.
    pub fn load_latest(&self) -> Result<Snapshot, SnapshotError> {
        let files = discover_snapshots(&self.dir)?;
        for (_, path) in files.into_iter().rev() {
            match self.load(&path) {
                Ok(snapshot) => return Ok(snapshot),
                Err(SnapshotError::Io(e)) => return Err(SnapshotError::Io(e)),
                Err(_) => continue, // damaged or unreadable, try an older one
            }
        }
        Err(SnapshotError::NoSnapshots)
    }

    /// Load and validate a specific snapshot file.
    pub fn load(&self, path: &Path) -> Result<Snapshot, SnapshotError> {
        let raw = fs::read(path)?;
        let compressed = path
            .extension()
            .map(|ext| ext == "zst")
            .unwrap_or(false);

        let encoded = if compressed {
            zstd::stream::decode_all(&raw[..])?
        } else {
            raw
        };

        let snapshot: Snapshot = bincode::deserialize(&encoded)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        if !snapshot.verify_integrity() {
            return Err(SnapshotError::IntegrityFailure {
                expected: snapshot.checksum.clone(),
                actual: state_hash(&snapshot.state),
            });
        }
        Ok(snapshot)
    }
}

// ── Internal Helpers ────────────────────────────────────────────────

fn snapshot_path(dir: &Path, sequence: u64, compressed: bool) -> PathBuf {
    if compressed {
        dir.join(format!("snapshot-{:012}.snap.zst", sequence))
    } else {
        dir.join(format!("snapshot-{:012}.snap", sequence))
    }
}

/// Discover snapshot files, sorted ascending by sequence.
fn discover_snapshots(dir: &Path) -> Result<Vec<(u64, PathBuf)>, SnapshotError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<(u64, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            let stem = name
                .strip_suffix(".snap.zst")
                .or_else(|| name.strip_suffix(".snap"))?;
            let seq = stem.strip_prefix("snapshot-")?.parse::<u64>().ok()?;
            Some((seq, e.path()))
        })
        .collect();
    files.sort_by_key(|(seq, _)| *seq);
    Ok(files)
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LedgerStore, NewAsset};
    use tempfile::TempDir;
    use types::ids::TenantId;
    use types::money::Money;

    const T0: i64 = 1_708_123_456_789_000_000;

    fn populated_state() -> LedgerState {
        let mut store = LedgerStore::in_memory();
        let tenant = TenantId::new();
        store.register_tenant(tenant, T0).unwrap();
        store
            .create_asset(
                tenant,
                NewAsset {
                    name: "Rolex Submariner".to_string(),
                    category_id: None,
                    purchase_price: Money::from_u64(8_500),
                    purchase_date: T0,
                },
                T0,
            )
            .unwrap();
        store.state().clone()
    }

    #[test]
    fn test_state_hash_deterministic() {
        let state = populated_state();
        assert_eq!(state_hash(&state), state_hash(&state.clone()));
    }

    #[test]
    fn test_state_hash_differs() {
        let state = populated_state();
        let empty = LedgerState::empty();
        assert_ne!(state_hash(&state), state_hash(&empty));
    }

    #[test]
    fn test_snapshot_integrity() {
        let snapshot = Snapshot::new(2, T0, populated_state(), false);
        assert!(snapshot.verify_integrity());
    }

    #[test]
    fn test_snapshot_integrity_detects_tamper() {
        let mut snapshot = Snapshot::new(2, T0, populated_state(), false);
        snapshot.state.last_sequence += 1;
        assert!(!snapshot.verify_integrity());
    }

    #[test]
    fn test_write_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(SnapshotConfig {
            compress: false,
            ..SnapshotConfig::new(tmp.path())
        });

        let state = populated_state();
        let path = writer.write_state(&state, T0).unwrap();
        assert!(path.exists());

        let loader = SnapshotLoader::new(tmp.path());
        let loaded = loader.load(&path).unwrap();
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.sequence, state.last_sequence);
    }

    #[test]
    fn test_compressed_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(SnapshotConfig::new(tmp.path()));

        let state = populated_state();
        let path = writer.write_state(&state, T0).unwrap();
        assert!(path.to_string_lossy().ends_with(".snap.zst"));

        let loader = SnapshotLoader::new(tmp.path());
        let loaded = loader.load_latest().unwrap();
        assert_eq!(loaded.state, state);
    }

    #[test]
    fn test_load_latest_empty_dir() {
        let tmp = TempDir::new().unwrap();
        let loader = SnapshotLoader::new(tmp.path());
        assert!(matches!(
            loader.load_latest(),
            Err(SnapshotError::NoSnapshots)
        ));
    }

    #[test]
    fn test_load_latest_picks_newest() {
        let tmp = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(SnapshotConfig::new(tmp.path()));

        let mut state = LedgerState::empty();
        state.last_sequence = 5;
        writer.write_state(&state, T0).unwrap();
        state.last_sequence = 9;
        writer.write_state(&state, T0 + 1).unwrap();

        let loader = SnapshotLoader::new(tmp.path());
        let latest = loader.load_latest().unwrap();
        assert_eq!(latest.sequence, 9);
    }

    #[test]
    fn test_load_latest_skips_damaged() {
        let tmp = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(SnapshotConfig {
            compress: false,
            ..SnapshotConfig::new(tmp.path())
        });

        let mut state = LedgerState::empty();
        state.last_sequence = 5;
        writer.write_state(&state, T0).unwrap();
        state.last_sequence = 9;
        let newest = writer.write_state(&state, T0 + 1).unwrap();

        // Truncate the newest file so it cannot decode
        fs::write(&newest, b"garbage").unwrap();

        let loader = SnapshotLoader::new(tmp.path());
        let latest = loader.load_latest().unwrap();
        assert_eq!(latest.sequence, 5, "fell back to the older snapshot");
    }

    #[test]
    fn test_retention_keeps_last_n() {
        let tmp = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(SnapshotConfig {
            keep_last: 2,
            ..SnapshotConfig::new(tmp.path())
        });

        let mut state = LedgerState::empty();
        for seq in 1..=5 {
            state.last_sequence = seq;
            writer.write_state(&state, T0 + seq as i64).unwrap();
        }

        let loader = SnapshotLoader::new(tmp.path());
        let files = loader.list().unwrap();
        assert_eq!(files.len(), 2);

        let latest = loader.load_latest().unwrap();
        assert_eq!(latest.sequence, 5);
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut snapshot = Snapshot::new(1, T0, LedgerState::empty(), false);
        snapshot.version = 99;

        let encoded = bincode::serialize(&snapshot).unwrap();
        let path = tmp.path().join("snapshot-000000000001.snap");
        fs::write(&path, encoded).unwrap();

        let loader = SnapshotLoader::new(tmp.path());
        assert!(matches!(
            loader.load(&path),
            Err(SnapshotError::UnsupportedVersion(99))
        ));
    }
}
