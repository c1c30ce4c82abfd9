//! Ledger event definitions
//!
//! Every mutation of the store is captured as one `LedgerEvent` — the
//! unit that gets journaled and replayed. Events carry everything replay
//! needs verbatim (including generated IDs and derived audit records) so
//! rebuilding state from the journal is exactly deterministic.

use serde::{Deserialize, Serialize};
use types::asset::Asset;
use types::category::Category;
use types::ids::{AssetId, CategoryId, TenantId};
use types::valuation::ValuationEvent;

/// A single replayable state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A tenant joined; carries the seeded default categories.
    TenantRegistered {
        tenant_id: TenantId,
        categories: Vec<Category>,
        timestamp: i64,
    },
    /// An asset was created; `audit` is its genesis valuation record.
    AssetCreated { asset: Asset, audit: ValuationEvent },
    /// Metadata and/or valuation update. `audit` is present only when
    /// the valuation actually changed.
    AssetUpdated {
        tenant_id: TenantId,
        asset_id: AssetId,
        name: String,
        category_id: Option<CategoryId>,
        audit: Option<ValuationEvent>,
        timestamp: i64,
    },
    /// Soft delete; the audit record carries the value unchanged.
    AssetArchived {
        tenant_id: TenantId,
        asset_id: AssetId,
        audit: ValuationEvent,
    },
    /// Reversal of a soft delete.
    AssetRestored {
        tenant_id: TenantId,
        asset_id: AssetId,
        audit: ValuationEvent,
    },
    CategoryCreated { category: Category },
    /// Hard delete of a category; affected assets are detached on apply.
    CategoryDeleted {
        tenant_id: TenantId,
        category_id: CategoryId,
        timestamp: i64,
    },
}

impl LedgerEvent {
    /// Stable event-type tag written into journal frames.
    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::TenantRegistered { .. } => "TenantRegistered",
            LedgerEvent::AssetCreated { .. } => "AssetCreated",
            LedgerEvent::AssetUpdated { .. } => "AssetUpdated",
            LedgerEvent::AssetArchived { .. } => "AssetArchived",
            LedgerEvent::AssetRestored { .. } => "AssetRestored",
            LedgerEvent::CategoryCreated { .. } => "CategoryCreated",
            LedgerEvent::CategoryDeleted { .. } => "CategoryDeleted",
        }
    }

    /// Tenant whose book this event belongs to.
    pub fn tenant_id(&self) -> TenantId {
        match self {
            LedgerEvent::TenantRegistered { tenant_id, .. } => *tenant_id,
            LedgerEvent::AssetCreated { asset, .. } => asset.tenant_id,
            LedgerEvent::AssetUpdated { tenant_id, .. } => *tenant_id,
            LedgerEvent::AssetArchived { tenant_id, .. } => *tenant_id,
            LedgerEvent::AssetRestored { tenant_id, .. } => *tenant_id,
            LedgerEvent::CategoryCreated { category } => category.tenant_id,
            LedgerEvent::CategoryDeleted { tenant_id, .. } => *tenant_id,
        }
    }

    /// When the event happened (unix ns).
    pub fn timestamp(&self) -> i64 {
        match self {
            LedgerEvent::TenantRegistered { timestamp, .. } => *timestamp,
            LedgerEvent::AssetCreated { audit, .. } => audit.recorded_at,
            LedgerEvent::AssetUpdated { timestamp, .. } => *timestamp,
            LedgerEvent::AssetArchived { audit, .. } => audit.recorded_at,
            LedgerEvent::AssetRestored { audit, .. } => audit.recorded_at,
            LedgerEvent::CategoryCreated { category } => category.created_at,
            LedgerEvent::CategoryDeleted { timestamp, .. } => *timestamp,
        }
    }

    /// Serialize to the journal payload encoding.
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from a journal payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
