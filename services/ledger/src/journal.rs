//! Journal Writer — Append-only audit journal with checksums
//!
//! The write-ahead log behind the valuation store. Entries are framed,
//! checksummed, and strictly sequenced; files rotate at a size limit.
//! Nothing ever rewrites a frame in place.
//!
//! # Binary Format (per entry)
//! ```text
//! [total_len: u32]
//! [sequence:  u64]
//! [timestamp: i64]
//! [tenant: 16 bytes]  // UUID of the owning tenant
//! [event_type_len: u16][event_type: bytes]
//! [payload_len: u32][payload: bytes]
//! [checksum: u32]  // CRC32C over sequence+timestamp+tenant+event_type+payload
//! ```

use crc32c::crc32c;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use types::ids::TenantId;
use uuid::Uuid;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Sequence error: expected {expected}, got {got}")]
    SequenceError { expected: u64, got: u64 },

    #[error("Journal size limit exceeded: {current} >= {limit}")]
    SizeLimitExceeded { current: u64, limit: u64 },
}

// ── Journal Entry ───────────────────────────────────────────────────

/// A single journal entry representing one persisted ledger event.
///
/// The tenant is part of the frame (not just the payload) so audit
/// tooling can filter a tenant's history without decoding payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Ledger-wide monotonic sequence number
    pub sequence: u64,
    /// Unix nanosecond timestamp of the recorded change
    pub timestamp: i64,
    /// Owning tenant
    pub tenant_id: TenantId,
    /// Event type tag (see `LedgerEvent::event_type`)
    pub event_type: String,
    /// Bincode-serialized `LedgerEvent`
    pub payload: Vec<u8>,
    /// CRC32C checksum over (sequence ++ timestamp ++ tenant ++ event_type ++ payload)
    pub checksum: u32,
}

impl JournalEntry {
    /// Create a new entry, computing the CRC32C checksum automatically.
    pub fn new(
        sequence: u64,
        timestamp: i64,
        tenant_id: TenantId,
        event_type: String,
        payload: Vec<u8>,
    ) -> Self {
        let checksum =
            Self::compute_checksum(sequence, timestamp, tenant_id, &event_type, &payload);
        Self {
            sequence,
            timestamp,
            tenant_id,
            event_type,
            payload,
            checksum,
        }
    }

    /// Compute CRC32C over the frame body fields.
    pub fn compute_checksum(
        sequence: u64,
        timestamp: i64,
        tenant_id: TenantId,
        event_type: &str,
        payload: &[u8],
    ) -> u32 {
        let mut buf = Vec::with_capacity(8 + 8 + 16 + event_type.len() + payload.len());
        buf.extend_from_slice(&sequence.to_le_bytes());
        buf.extend_from_slice(&timestamp.to_le_bytes());
        buf.extend_from_slice(tenant_id.as_uuid().as_bytes());
        buf.extend_from_slice(event_type.as_bytes());
        buf.extend_from_slice(payload);
        crc32c(&buf)
    }

    /// Validate the stored checksum against recomputed value.
    pub fn verify_checksum(&self) -> bool {
        let expected = Self::compute_checksum(
            self.sequence,
            self.timestamp,
            self.tenant_id,
            &self.event_type,
            &self.payload,
        );
        self.checksum == expected
    }

    /// Serialize entry to the binary wire format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let event_type_bytes = self.event_type.as_bytes();
        let event_type_len = event_type_bytes.len() as u16;
        let payload_len = self.payload.len() as u32;

        // body = 8 (seq) + 8 (ts) + 16 (tenant) + 2 (et_len) + et + 4 (pl_len) + pl + 4 (crc)
        let body_len: u32 = 8 + 8 + 16 + 2 + (event_type_len as u32) + 4 + payload_len + 4;

        let mut buf = Vec::with_capacity(4 + body_len as usize);
        buf.extend_from_slice(&body_len.to_le_bytes());
        buf.extend_from_slice(&self.sequence.to_le_bytes());
        buf.extend_from_slice(&self.timestamp.to_le_bytes());
        buf.extend_from_slice(self.tenant_id.as_uuid().as_bytes());
        buf.extend_from_slice(&event_type_len.to_le_bytes());
        buf.extend_from_slice(event_type_bytes);
        buf.extend_from_slice(&payload_len.to_le_bytes());
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&self.checksum.to_le_bytes());
        buf
    }

    /// Deserialize entry from the binary wire format.
    ///
    /// Returns `(entry, bytes_consumed)` on success. Corrupted data
    /// yields errors rather than panics.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), JournalError> {
        if data.len() < 4 {
            return Err(JournalError::Serialization(
                "Not enough data for length prefix".into(),
            ));
        }

        let body_len = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        // Reject absurdly large body_len (likely corruption)
        if body_len > 100_000_000 {
            return Err(JournalError::Serialization(format!(
                "Implausible body length: {} (likely corruption)",
                body_len
            )));
        }

        let total = 4 + body_len;

        if data.len() < total {
            return Err(JournalError::Serialization(format!(
                "Incomplete entry: need {} bytes, have {}",
                total,
                data.len()
            )));
        }

        // Minimum body: 8 + 8 + 16 + 2 + 0 (et) + 4 + 0 (pl) + 4 = 42
        if body_len < 42 {
            return Err(JournalError::Serialization(format!(
                "Body too small: {} bytes, minimum is 42",
                body_len
            )));
        }

        let body = &data[4..total];
        let mut pos: usize = 0;

        // sequence (u64)
        let sequence = u64::from_le_bytes(body[pos..pos + 8].try_into().unwrap());
        pos += 8;

        // timestamp (i64)
        let timestamp = i64::from_le_bytes(body[pos..pos + 8].try_into().unwrap());
        pos += 8;

        // tenant (16-byte UUID)
        let tenant_bytes: [u8; 16] = body[pos..pos + 16].try_into().unwrap();
        let tenant_id = TenantId::from_uuid(Uuid::from_bytes(tenant_bytes));
        pos += 16;

        // event_type_len (u16) + event_type
        let event_type_len = u16::from_le_bytes(body[pos..pos + 2].try_into().unwrap()) as usize;
        pos += 2;

        if pos + event_type_len > body.len() {
            return Err(JournalError::Serialization(format!(
                "event_type_len {} exceeds remaining body ({} bytes)",
                event_type_len,
                body.len() - pos
            )));
        }
        let event_type = String::from_utf8(body[pos..pos + event_type_len].to_vec())
            .map_err(|e| JournalError::Serialization(e.to_string()))?;
        pos += event_type_len;

        // payload_len (u32) + payload
        if pos + 4 > body.len() {
            return Err(JournalError::Serialization(
                "Not enough data for payload length".into(),
            ));
        }
        let payload_len = u32::from_le_bytes(body[pos..pos + 4].try_into().unwrap()) as usize;
        pos += 4;

        if pos + payload_len > body.len() {
            return Err(JournalError::Serialization(format!(
                "payload_len {} exceeds remaining body ({} bytes)",
                payload_len,
                body.len() - pos
            )));
        }
        let payload = body[pos..pos + payload_len].to_vec();
        pos += payload_len;

        // checksum (u32)
        if pos + 4 > body.len() {
            return Err(JournalError::Serialization(
                "Not enough data for checksum".into(),
            ));
        }
        let checksum = u32::from_le_bytes(body[pos..pos + 4].try_into().unwrap());

        let entry = Self {
            sequence,
            timestamp,
            tenant_id,
            event_type,
            payload,
            checksum,
        };

        Ok((entry, total))
    }
}

// ── Flush / Fsync Policies ──────────────────────────────────────────

/// Controls when buffered data is flushed to OS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlushPolicy {
    /// Flush after every write.
    EveryWrite,
    /// Flush every N writes.
    EveryN(usize),
}

/// Controls when `fsync` (durable write) is called.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FsyncPolicy {
    /// Fsync after every write.
    EveryWrite,
    /// Fsync every N writes.
    EveryN(usize),
    /// Fsync only on file rotation.
    OnRotation,
}

// ── Journal Writer Configuration ────────────────────────────────────

/// Configuration for the journal writer.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Directory for journal files.
    pub dir: PathBuf,
    /// Maximum file size in bytes before rotation (default 64 MiB).
    pub max_file_size: u64,
    /// Maximum total journal size in bytes (0 = unlimited).
    pub max_total_size: u64,
    /// Flush policy.
    pub flush_policy: FlushPolicy,
    /// Fsync policy.
    pub fsync_policy: FsyncPolicy,
}

impl JournalConfig {
    /// Create a config with sensible defaults.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_file_size: 64 * 1024 * 1024, // 64 MiB
            max_total_size: 0,               // unlimited
            flush_policy: FlushPolicy::EveryWrite,
            fsync_policy: FsyncPolicy::EveryWrite,
        }
    }
}

// ── Journal Writer ──────────────────────────────────────────────────

/// Append-only journal writer with checksums, rotation, and fsync control.
pub struct JournalWriter {
    config: JournalConfig,
    writer: BufWriter<File>,
    current_file: PathBuf,
    current_file_size: u64,
    next_sequence: u64,
    writes_since_flush: usize,
    writes_since_fsync: usize,
    file_index: u64,
    total_size: u64,
}

impl JournalWriter {
    /// Open a new journal writer, creating the directory if needed.
    pub fn open(config: JournalConfig) -> Result<Self, JournalError> {
        fs::create_dir_all(&config.dir)?;

        // Scan existing journal files to find the latest index
        let file_index = Self::find_latest_index(&config.dir);
        let current_file = Self::journal_path(&config.dir, file_index);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&current_file)?;

        let current_file_size = file.metadata()?.len();
        let total_size = Self::compute_total_size(&config.dir)?;

        Ok(Self {
            config,
            writer: BufWriter::new(file),
            current_file,
            current_file_size,
            next_sequence: 0, // Set by caller or via recovery
            writes_since_flush: 0,
            writes_since_fsync: 0,
            file_index,
            total_size,
        })
    }

    /// Set the next expected sequence number (used after recovery).
    pub fn set_next_sequence(&mut self, seq: u64) {
        self.next_sequence = seq;
    }

    /// Get the next expected sequence number.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Get the current file path.
    pub fn current_file_path(&self) -> &Path {
        &self.current_file
    }

    /// Append a journal entry. Validates sequence monotonicity.
    pub fn append(&mut self, entry: &JournalEntry) -> Result<(), JournalError> {
        if self.next_sequence > 0 && entry.sequence != self.next_sequence {
            return Err(JournalError::SequenceError {
                expected: self.next_sequence,
                got: entry.sequence,
            });
        }

        if self.config.max_total_size > 0 && self.total_size >= self.config.max_total_size {
            return Err(JournalError::SizeLimitExceeded {
                current: self.total_size,
                limit: self.config.max_total_size,
            });
        }

        if self.current_file_size >= self.config.max_file_size {
            self.rotate()?;
        }

        let bytes = entry.to_bytes();
        self.writer.write_all(&bytes)?;

        let written = bytes.len() as u64;
        self.current_file_size += written;
        self.total_size += written;
        self.next_sequence = entry.sequence + 1;
        self.writes_since_flush += 1;
        self.writes_since_fsync += 1;

        self.apply_flush_policy()?;
        self.apply_fsync_policy()?;

        Ok(())
    }

    /// Create a new entry and append it in one call.
    pub fn write_event(
        &mut self,
        sequence: u64,
        timestamp: i64,
        tenant_id: TenantId,
        event_type: String,
        payload: Vec<u8>,
    ) -> Result<JournalEntry, JournalError> {
        let entry = JournalEntry::new(sequence, timestamp, tenant_id, event_type, payload);
        self.append(&entry)?;
        Ok(entry)
    }

    /// Force flush + fsync (used before shutdown / rotation).
    pub fn sync(&mut self) -> Result<(), JournalError> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        self.writes_since_flush = 0;
        self.writes_since_fsync = 0;
        Ok(())
    }

    // ── Internal Helpers ────────────────────────────────────────────

    fn apply_flush_policy(&mut self) -> Result<(), JournalError> {
        let should_flush = match self.config.flush_policy {
            FlushPolicy::EveryWrite => true,
            FlushPolicy::EveryN(n) => self.writes_since_flush >= n,
        };
        if should_flush {
            self.writer.flush()?;
            self.writes_since_flush = 0;
        }
        Ok(())
    }

    fn apply_fsync_policy(&mut self) -> Result<(), JournalError> {
        let should_fsync = match self.config.fsync_policy {
            FsyncPolicy::EveryWrite => true,
            FsyncPolicy::EveryN(n) => self.writes_since_fsync >= n,
            FsyncPolicy::OnRotation => false,
        };
        if should_fsync {
            self.writer.get_ref().sync_all()?;
            self.writes_since_fsync = 0;
        }
        Ok(())
    }

    fn rotate(&mut self) -> Result<(), JournalError> {
        // Fsync current file before rotating
        self.sync()?;

        self.file_index += 1;
        self.current_file = Self::journal_path(&self.config.dir, self.file_index);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.current_file)?;

        self.writer = BufWriter::new(file);
        self.current_file_size = 0;
        Ok(())
    }

    pub(crate) fn journal_path(dir: &Path, index: u64) -> PathBuf {
        dir.join(format!("ledger-{:06}.wal", index))
    }

    fn find_latest_index(dir: &Path) -> u64 {
        fs::read_dir(dir)
            .ok()
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| {
                        let name = e.file_name().to_string_lossy().to_string();
                        if name.starts_with("ledger-") && name.ends_with(".wal") {
                            name.trim_start_matches("ledger-")
                                .trim_end_matches(".wal")
                                .parse::<u64>()
                                .ok()
                        } else {
                            None
                        }
                    })
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    fn compute_total_size(dir: &Path) -> Result<u64, JournalError> {
        let mut total = 0u64;
        if dir.exists() {
            for entry in fs::read_dir(dir)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    total += entry.metadata()?.len();
                }
            }
        }
        Ok(total)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
