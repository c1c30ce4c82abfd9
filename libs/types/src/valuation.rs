//! Immutable valuation audit events
//!
//! Every change to an asset's valuation is recorded as a `ValuationEvent`.
//! Events are append-only: nothing in this crate (or any other) can edit
//! or delete one once recorded. Archiving an asset hides it from active
//! views; its event history stays intact.

use crate::ids::{AssetId, EventId, TenantId};
use crate::money::Money;
use chrono::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of change the audit record captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValuationKind {
    /// Genesis record written when the asset is created.
    Created,
    /// A market revaluation (manual update or appraisal).
    Revalued,
    /// Asset archived; value carried unchanged for the record.
    Archived,
    /// Asset restored from the archive.
    Restored,
}

impl ValuationKind {
    /// Stable string form for API payloads and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationKind::Created => "Created",
            ValuationKind::Revalued => "Revalued",
            ValuationKind::Archived => "Archived",
            ValuationKind::Restored => "Restored",
        }
    }
}

impl fmt::Display for ValuationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable entry in an asset's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationEvent {
    pub event_id: EventId,
    pub tenant_id: TenantId,
    pub asset_id: AssetId,
    /// Ledger-wide monotonic sequence number assigned at append time.
    pub sequence: u64,
    pub kind: ValuationKind,
    pub old_value: Money,
    pub new_value: Money,
    pub note: Option<String>,
    /// Unix nanosecond timestamp of the change.
    pub recorded_at: i64,
}

impl ValuationEvent {
    /// Create a new audit event with a fresh event ID.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: TenantId,
        asset_id: AssetId,
        sequence: u64,
        kind: ValuationKind,
        old_value: Money,
        new_value: Money,
        note: Option<String>,
        recorded_at: i64,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            tenant_id,
            asset_id,
            sequence,
            kind,
            old_value,
            new_value,
            note,
            recorded_at,
        }
    }

    /// Signed value change captured by this event.
    pub fn delta(&self) -> Decimal {
        self.new_value.signed_diff(self.old_value)
    }

    /// RFC 3339 rendering of `recorded_at` for API responses.
    pub fn recorded_at_rfc3339(&self) -> String {
        DateTime::from_timestamp_nanos(self.recorded_at).to_rfc3339()
    }
}
