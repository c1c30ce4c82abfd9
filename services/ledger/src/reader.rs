//! Journal Reader — Sequential reader with corruption detection
//!
//! Replays the audit journal in order, validating every frame's CRC32C
//! checksum. Corruption is logged with byte offsets; a corrupted tail
//! can be skipped so the valid prefix is still recoverable.

use crate::journal::{JournalEntry, JournalError};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use types::ids::TenantId;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("Checksum mismatch at byte offset {offset}: entry seq={sequence}")]
    ChecksumMismatch { offset: u64, sequence: u64 },

    #[error("Sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },

    #[error("Duplicate sequence: {sequence}")]
    DuplicateSequence { sequence: u64 },

    #[error("Sequence not monotonic: prev={prev}, current={current}")]
    NotMonotonic { prev: u64, current: u64 },
}

// ── Corruption Log Entry ────────────────────────────────────────────

/// Structured corruption log entry for diagnostics.
#[derive(Debug, Clone)]
pub struct CorruptionRecord {
    /// Byte offset in the file where corruption was detected.
    pub byte_offset: u64,
    /// Type of corruption.
    pub kind: CorruptionKind,
    /// Human-readable detail message.
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CorruptionKind {
    ChecksumMismatch,
    TruncatedEntry,
}

// ── Journal Reader ──────────────────────────────────────────────────

/// Sequential journal reader with checksum validation and corruption detection.
pub struct JournalReader {
    /// All journal file paths, sorted by index.
    files: Vec<PathBuf>,
    /// Index of the current file being read.
    current_file_idx: usize,
    /// Raw data of the current file.
    data: Vec<u8>,
    /// Current read position within `data`.
    pos: usize,
    /// Global byte offset (across all files).
    global_offset: u64,
    /// Last successfully read sequence number.
    last_sequence: Option<u64>,
    /// Accumulated corruption records.
    corruption_log: Vec<CorruptionRecord>,
}

impl JournalReader {
    /// Open a reader over all journal files in the given directory.
    pub fn open(dir: &Path) -> Result<Self, ReaderError> {
        let files = Self::discover_files(dir)?;
        let mut reader = Self {
            files,
            current_file_idx: 0,
            data: Vec::new(),
            pos: 0,
            global_offset: 0,
            last_sequence: None,
            corruption_log: Vec::new(),
        };
        reader.load_current_file()?;
        Ok(reader)
    }

    /// Read the next valid entry, validating its checksum.
    ///
    /// Returns `None` when all entries have been read.
    pub fn next_entry(&mut self) -> Result<Option<JournalEntry>, ReaderError> {
        loop {
            if self.pos >= self.data.len() {
                if !self.advance_file()? {
                    return Ok(None); // All files exhausted
                }
            }

            let offset_before = self.global_offset;
            match JournalEntry::from_bytes(&self.data[self.pos..]) {
                Ok((entry, consumed)) => {
                    self.pos += consumed;
                    self.global_offset += consumed as u64;

                    if !entry.verify_checksum() {
                        self.corruption_log.push(CorruptionRecord {
                            byte_offset: offset_before,
                            kind: CorruptionKind::ChecksumMismatch,
                            detail: format!(
                                "CRC32C mismatch for seq={}, stored={:#010x}",
                                entry.sequence, entry.checksum
                            ),
                        });
                        return Err(ReaderError::ChecksumMismatch {
                            offset: offset_before,
                            sequence: entry.sequence,
                        });
                    }

                    self.last_sequence = Some(entry.sequence);
                    return Ok(Some(entry));
                }
                Err(_) => {
                    // Could be a truncated entry at end of file
                    let remaining = self.data.len() - self.pos;
                    if remaining > 0 {
                        self.corruption_log.push(CorruptionRecord {
                            byte_offset: offset_before,
                            kind: CorruptionKind::TruncatedEntry,
                            detail: format!(
                                "Truncated entry: {} bytes remaining, cannot parse",
                                remaining
                            ),
                        });
                    }
                    // Try next file
                    self.pos = self.data.len();
                }
            }
        }
    }

    /// Read all valid entries, collecting them into a Vec.
    pub fn read_all(&mut self) -> Result<Vec<JournalEntry>, ReaderError> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next_entry()? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Read all entries, enforcing gapless sequence numbering.
    ///
    /// Returns entries up to the first sequence violation.
    pub fn read_all_validated(&mut self) -> Result<Vec<JournalEntry>, ReaderError> {
        let mut entries = Vec::new();
        let mut expected_seq: Option<u64> = None;

        while let Some(entry) = self.next_entry()? {
            if let Some(exp) = expected_seq {
                if entry.sequence != exp {
                    return Err(ReaderError::SequenceGap {
                        expected: exp,
                        got: entry.sequence,
                    });
                }
            }
            expected_seq = Some(entry.sequence + 1);
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Read all valid entries belonging to one tenant.
    ///
    /// Filters on the frame header, so foreign payloads are never
    /// decoded — tenant isolation holds even at the audit-tooling level.
    pub fn read_tenant(&mut self, tenant_id: TenantId) -> Result<Vec<JournalEntry>, ReaderError> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next_entry()? {
            if entry.tenant_id == tenant_id {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Seek to the first entry with `sequence >= target_seq`.
    ///
    /// Entries before `target_seq` are skipped. Returns the number of
    /// entries skipped.
    pub fn seek_to_sequence(&mut self, target_seq: u64) -> Result<u64, ReaderError> {
        let mut skipped = 0u64;
        loop {
            if self.pos >= self.data.len() {
                if !self.advance_file()? {
                    break; // All files exhausted
                }
            }

            match JournalEntry::from_bytes(&self.data[self.pos..]) {
                Ok((entry, consumed)) => {
                    if entry.sequence >= target_seq {
                        // Don't consume; leave positioned for next_entry()
                        break;
                    }
                    self.pos += consumed;
                    self.global_offset += consumed as u64;
                    self.last_sequence = Some(entry.sequence);
                    skipped += 1;
                }
                Err(_) => {
                    self.pos = self.data.len();
                }
            }
        }
        Ok(skipped)
    }

    /// Attempt partial recovery: read as many valid entries as possible,
    /// skipping over corrupted regions.
    pub fn recover_entries(&mut self) -> (Vec<JournalEntry>, Vec<CorruptionRecord>) {
        let mut entries = Vec::new();

        loop {
            match self.next_entry() {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => break,
                Err(ReaderError::ChecksumMismatch { .. }) => {
                    // Scan forward for the next plausible frame
                    self.skip_corrupted_region();
                }
                Err(_) => break,
            }
        }

        let corruption_log = self.corruption_log.clone();
        (entries, corruption_log)
    }

    /// Get the current global byte offset.
    pub fn current_offset(&self) -> u64 {
        self.global_offset
    }

    /// Get the last successfully read sequence number.
    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    /// Get all accumulated corruption records.
    pub fn corruption_log(&self) -> &[CorruptionRecord] {
        &self.corruption_log
    }

    /// Validate that a list of entries has gapless, monotonic sequences.
    pub fn validate_sequences(entries: &[JournalEntry]) -> Result<(), ReaderError> {
        for window in entries.windows(2) {
            let prev = &window[0];
            let curr = &window[1];

            if curr.sequence <= prev.sequence {
                return Err(ReaderError::NotMonotonic {
                    prev: prev.sequence,
                    current: curr.sequence,
                });
            }

            if curr.sequence != prev.sequence + 1 {
                return Err(ReaderError::SequenceGap {
                    expected: prev.sequence + 1,
                    got: curr.sequence,
                });
            }
        }
        Ok(())
    }

    /// Detect missing sequences in a range.
    pub fn find_missing_sequences(
        entries: &[JournalEntry],
        expected_start: u64,
        expected_end: u64,
    ) -> Vec<u64> {
        let present: std::collections::HashSet<u64> =
            entries.iter().map(|e| e.sequence).collect();
        (expected_start..=expected_end)
            .filter(|s| !present.contains(s))
            .collect()
    }

    // ── Internal Helpers ────────────────────────────────────────────

    fn discover_files(dir: &Path) -> Result<Vec<PathBuf>, ReaderError> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files: Vec<(u64, PathBuf)> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().to_string();
                if name.starts_with("ledger-") && name.ends_with(".wal") {
                    let idx = name
                        .trim_start_matches("ledger-")
                        .trim_end_matches(".wal")
                        .parse::<u64>()
                        .ok()?;
                    Some((idx, e.path()))
                } else {
                    None
                }
            })
            .collect();

        files.sort_by_key(|(idx, _)| *idx);
        Ok(files.into_iter().map(|(_, p)| p).collect())
    }

    fn load_current_file(&mut self) -> Result<(), ReaderError> {
        if self.current_file_idx < self.files.len() {
            let mut file = File::open(&self.files[self.current_file_idx])?;
            self.data.clear();
            file.read_to_end(&mut self.data)?;
            self.pos = 0;
        } else {
            self.data.clear();
            self.pos = 0;
        }
        Ok(())
    }

    fn advance_file(&mut self) -> Result<bool, ReaderError> {
        self.current_file_idx += 1;
        if self.current_file_idx < self.files.len() {
            self.load_current_file()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn skip_corrupted_region(&mut self) {
        // Skip forward byte-by-byte looking for a valid length prefix
        while self.pos < self.data.len() {
            self.pos += 1;
            self.global_offset += 1;
            if self.pos + 4 <= self.data.len() {
                let len = u32::from_le_bytes([
                    self.data[self.pos],
                    self.data[self.pos + 1],
                    self.data[self.pos + 2],
                    self.data[self.pos + 3],
                ]) as usize;
                if len > 0 && len < 10_000_000 && self.pos + 4 + len <= self.data.len() {
                    // Possible valid entry found, stop skipping
                    break;
                }
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
