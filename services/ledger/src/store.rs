//! LedgerStore — multi-tenant state with a write-ahead audit journal
//!
//! Commands validate against current state, journal a `LedgerEvent`, and
//! then apply it. State transitions happen in exactly one place
//! (`LedgerState::apply`), shared between the live command path and
//! crash-recovery replay, so a rebuilt store is bit-identical to the one
//! that crashed.
//!
//! Tenant isolation is structural: each tenant's book is a separate map
//! entry, and every command and query takes the caller's `TenantId`. An
//! asset owned by another tenant is indistinguishable from one that does
//! not exist.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use types::asset::{Asset, AssetStatus};
use types::category::{self, Category};
use types::errors::{AssetError, CategoryError, LedgerError, TenantError};
use types::ids::{AssetId, CategoryId, TenantId};
use types::money::Money;
use types::valuation::{ValuationEvent, ValuationKind};

use crate::events::LedgerEvent;
use crate::journal::JournalWriter;

// ── State ───────────────────────────────────────────────────────────

/// One tenant's holdings: assets, categories, and per-asset audit trails.
///
/// `BTreeMap` keys give deterministic iteration for snapshots and hashing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantBook {
    pub assets: BTreeMap<AssetId, Asset>,
    pub categories: BTreeMap<CategoryId, Category>,
    /// Append-only valuation history per asset. Entries are pushed in
    /// sequence order and never edited or removed.
    pub audit: BTreeMap<AssetId, Vec<ValuationEvent>>,
}

/// Full store state — the snapshot unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub tenants: BTreeMap<TenantId, TenantBook>,
    /// Sequence of the last applied event (0 = empty store).
    pub last_sequence: u64,
}

impl LedgerState {
    /// Create a new empty state.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Apply one event to the state.
    ///
    /// Commands validate preconditions before journaling, so a failure
    /// here means either a corrupted journal or a store bug.
    pub fn apply(&mut self, event: &LedgerEvent) -> Result<(), LedgerError> {
        match event {
            LedgerEvent::TenantRegistered {
                tenant_id,
                categories,
                ..
            } => {
                if self.tenants.contains_key(tenant_id) {
                    return Err(TenantError::AlreadyRegistered {
                        tenant_id: tenant_id.to_string(),
                    }
                    .into());
                }
                let mut book = TenantBook::default();
                for cat in categories {
                    book.categories.insert(cat.category_id, cat.clone());
                }
                self.tenants.insert(*tenant_id, book);
            }

            LedgerEvent::AssetCreated { asset, audit } => {
                let book = self.book_mut(asset.tenant_id)?;
                book.assets.insert(asset.asset_id, asset.clone());
                book.audit
                    .entry(asset.asset_id)
                    .or_default()
                    .push(audit.clone());
            }

            LedgerEvent::AssetUpdated {
                tenant_id,
                asset_id,
                name,
                category_id,
                audit,
                timestamp,
            } => {
                let book = self.book_mut(*tenant_id)?;
                let asset = Self::asset_mut(book, *asset_id)?;
                if let Some(audit) = audit {
                    asset.revalue(audit.new_value, audit.recorded_at);
                }
                asset.edit(name.clone(), *category_id, *timestamp);
                if let Some(audit) = audit {
                    book.audit.entry(*asset_id).or_default().push(audit.clone());
                }
            }

            LedgerEvent::AssetArchived {
                tenant_id,
                asset_id,
                audit,
            } => {
                let book = self.book_mut(*tenant_id)?;
                let asset = Self::asset_mut(book, *asset_id)?;
                if !asset.is_active() {
                    return Err(AssetError::AlreadyArchived {
                        asset_id: asset_id.to_string(),
                    }
                    .into());
                }
                asset.archive(audit.recorded_at);
                book.audit.entry(*asset_id).or_default().push(audit.clone());
            }

            LedgerEvent::AssetRestored {
                tenant_id,
                asset_id,
                audit,
            } => {
                let book = self.book_mut(*tenant_id)?;
                let asset = Self::asset_mut(book, *asset_id)?;
                if asset.is_active() {
                    return Err(AssetError::NotArchived {
                        asset_id: asset_id.to_string(),
                    }
                    .into());
                }
                asset.restore(audit.recorded_at);
                book.audit.entry(*asset_id).or_default().push(audit.clone());
            }

            LedgerEvent::CategoryCreated { category } => {
                let book = self.book_mut(category.tenant_id)?;
                book.categories.insert(category.category_id, category.clone());
            }

            LedgerEvent::CategoryDeleted {
                tenant_id,
                category_id,
                timestamp,
            } => {
                let book = self.book_mut(*tenant_id)?;
                if book.categories.remove(category_id).is_none() {
                    return Err(CategoryError::NotFound {
                        category_id: category_id.to_string(),
                    }
                    .into());
                }
                for asset in book.assets.values_mut() {
                    if asset.category_id == Some(*category_id) {
                        asset.detach_category(*timestamp);
                    }
                }
            }
        }
        Ok(())
    }

    fn book_mut(&mut self, tenant_id: TenantId) -> Result<&mut TenantBook, LedgerError> {
        self.tenants.get_mut(&tenant_id).ok_or_else(|| {
            TenantError::NotRegistered {
                tenant_id: tenant_id.to_string(),
            }
            .into()
        })
    }

    fn asset_mut(book: &mut TenantBook, asset_id: AssetId) -> Result<&mut Asset, LedgerError> {
        book.assets.get_mut(&asset_id).ok_or_else(|| {
            AssetError::NotFound {
                asset_id: asset_id.to_string(),
            }
            .into()
        })
    }
}

// ── Command Inputs ──────────────────────────────────────────────────

/// Input for creating an asset.
#[derive(Debug, Clone)]
pub struct NewAsset {
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub purchase_price: Money,
    /// Unix nanosecond timestamp of the purchase.
    pub purchase_date: i64,
}

/// Input for updating an asset.
#[derive(Debug, Clone)]
pub struct UpdateAsset {
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub current_value: Money,
    /// Audit note recorded when the valuation changes.
    pub note: Option<String>,
}

// ── Store ───────────────────────────────────────────────────────────

/// The Audit-Logged Valuation Store.
pub struct LedgerStore {
    state: LedgerState,
    journal: Option<JournalWriter>,
}

impl LedgerStore {
    /// Volatile store without a journal (tests, dry runs).
    pub fn in_memory() -> Self {
        Self {
            state: LedgerState::empty(),
            journal: None,
        }
    }

    /// Fresh durable store writing through the given journal.
    pub fn with_journal(mut journal: JournalWriter) -> Self {
        journal.set_next_sequence(1);
        Self {
            state: LedgerState::empty(),
            journal: Some(journal),
        }
    }

    /// Assemble a store from recovered state and a positioned journal.
    pub fn from_parts(state: LedgerState, journal: Option<JournalWriter>) -> Self {
        Self { state, journal }
    }

    /// Read-only view of the full state.
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Sequence of the last applied event.
    pub fn last_sequence(&self) -> u64 {
        self.state.last_sequence
    }

    /// Flush and fsync the journal (shutdown path).
    pub fn sync(&mut self) -> Result<(), LedgerError> {
        if let Some(journal) = self.journal.as_mut() {
            journal.sync().map_err(|e| LedgerError::System {
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    // ── Commands ────────────────────────────────────────────────────

    /// Register a tenant and seed the default asset-class profile.
    pub fn register_tenant(
        &mut self,
        tenant_id: TenantId,
        now: i64,
    ) -> Result<Vec<Category>, LedgerError> {
        if self.state.tenants.contains_key(&tenant_id) {
            return Err(TenantError::AlreadyRegistered {
                tenant_id: tenant_id.to_string(),
            }
            .into());
        }

        let categories: Vec<Category> = category::default_profile()
            .into_iter()
            .map(|(name, score)| Category::new(tenant_id, name, score, now))
            .collect();

        self.commit(LedgerEvent::TenantRegistered {
            tenant_id,
            categories: categories.clone(),
            timestamp: now,
        })?;
        Ok(categories)
    }

    /// Create an asset. Its genesis valuation event records the jump
    /// from zero to the purchase price.
    pub fn create_asset(
        &mut self,
        tenant_id: TenantId,
        input: NewAsset,
        now: i64,
    ) -> Result<Asset, LedgerError> {
        let book = self.book(tenant_id)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AssetError::InvalidName("name must not be empty".into()).into());
        }
        if let Some(category_id) = input.category_id {
            if !book.categories.contains_key(&category_id) {
                return Err(CategoryError::NotFound {
                    category_id: category_id.to_string(),
                }
                .into());
            }
        }

        let asset = Asset::new(
            tenant_id,
            name,
            input.category_id,
            input.purchase_price,
            input.purchase_date,
            now,
        );
        let audit = ValuationEvent::new(
            tenant_id,
            asset.asset_id,
            self.next_sequence(),
            ValuationKind::Created,
            Money::ZERO,
            input.purchase_price,
            Some("Initial Asset Creation / Purchase".to_string()),
            now,
        );

        self.commit(LedgerEvent::AssetCreated {
            asset: asset.clone(),
            audit,
        })?;
        self.get_asset(tenant_id, asset.asset_id)
    }

    /// Update an asset's metadata and/or valuation.
    ///
    /// A valuation event is appended only when the value actually
    /// changes; pure metadata edits leave the audit trail untouched.
    pub fn update_asset(
        &mut self,
        tenant_id: TenantId,
        asset_id: AssetId,
        input: UpdateAsset,
        now: i64,
    ) -> Result<Asset, LedgerError> {
        let asset = self.get_asset(tenant_id, asset_id)?;
        if !asset.is_active() {
            return Err(AssetError::AlreadyArchived {
                asset_id: asset_id.to_string(),
            }
            .into());
        }

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AssetError::InvalidName("name must not be empty".into()).into());
        }
        if let Some(category_id) = input.category_id {
            if !self.book(tenant_id)?.categories.contains_key(&category_id) {
                return Err(CategoryError::NotFound {
                    category_id: category_id.to_string(),
                }
                .into());
            }
        }

        let audit = if asset.current_value != input.current_value {
            Some(ValuationEvent::new(
                tenant_id,
                asset_id,
                self.next_sequence(),
                ValuationKind::Revalued,
                asset.current_value,
                input.current_value,
                Some(input.note.unwrap_or_else(|| "Manual Update".to_string())),
                now,
            ))
        } else {
            None
        };

        self.commit(LedgerEvent::AssetUpdated {
            tenant_id,
            asset_id,
            name: name.to_string(),
            category_id: input.category_id,
            audit,
            timestamp: now,
        })?;
        self.get_asset(tenant_id, asset_id)
    }

    /// Archive an asset (soft delete). The asset disappears from active
    /// views; its history stays.
    pub fn archive_asset(
        &mut self,
        tenant_id: TenantId,
        asset_id: AssetId,
        reason: Option<String>,
        now: i64,
    ) -> Result<Asset, LedgerError> {
        let asset = self.get_asset(tenant_id, asset_id)?;
        if !asset.is_active() {
            return Err(AssetError::AlreadyArchived {
                asset_id: asset_id.to_string(),
            }
            .into());
        }

        let note = format!(
            "Asset Archived: {}",
            reason.unwrap_or_else(|| "No reason provided".to_string())
        );
        let audit = ValuationEvent::new(
            tenant_id,
            asset_id,
            self.next_sequence(),
            ValuationKind::Archived,
            asset.current_value,
            asset.current_value,
            Some(note),
            now,
        );

        self.commit(LedgerEvent::AssetArchived {
            tenant_id,
            asset_id,
            audit,
        })?;
        self.get_asset(tenant_id, asset_id)
    }

    /// Restore an archived asset.
    pub fn restore_asset(
        &mut self,
        tenant_id: TenantId,
        asset_id: AssetId,
        now: i64,
    ) -> Result<Asset, LedgerError> {
        let asset = self.get_asset(tenant_id, asset_id)?;
        if asset.is_active() {
            return Err(AssetError::NotArchived {
                asset_id: asset_id.to_string(),
            }
            .into());
        }

        let audit = ValuationEvent::new(
            tenant_id,
            asset_id,
            self.next_sequence(),
            ValuationKind::Restored,
            asset.current_value,
            asset.current_value,
            Some("Asset Restored from Archive".to_string()),
            now,
        );

        self.commit(LedgerEvent::AssetRestored {
            tenant_id,
            asset_id,
            audit,
        })?;
        self.get_asset(tenant_id, asset_id)
    }

    /// Create a custom category.
    pub fn create_category(
        &mut self,
        tenant_id: TenantId,
        name: impl Into<String>,
        base_risk_score: u8,
        now: i64,
    ) -> Result<Category, LedgerError> {
        self.book(tenant_id)?;

        let name = name.into();
        if name.trim().is_empty() {
            return Err(CategoryError::InvalidName("name must not be empty".into()).into());
        }

        let category = Category::new(tenant_id, name.trim(), base_risk_score, now);
        self.commit(LedgerEvent::CategoryCreated {
            category: category.clone(),
        })?;
        Ok(category)
    }

    /// Delete a category, detaching any assets that referenced it.
    /// Categories are not audit-logged; the assets' valuations are
    /// untouched.
    pub fn delete_category(
        &mut self,
        tenant_id: TenantId,
        category_id: CategoryId,
        now: i64,
    ) -> Result<(), LedgerError> {
        let book = self.book(tenant_id)?;
        if !book.categories.contains_key(&category_id) {
            return Err(CategoryError::NotFound {
                category_id: category_id.to_string(),
            }
            .into());
        }

        self.commit(LedgerEvent::CategoryDeleted {
            tenant_id,
            category_id,
            timestamp: now,
        })
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Whether the tenant has been registered.
    pub fn is_registered(&self, tenant_id: TenantId) -> bool {
        self.state.tenants.contains_key(&tenant_id)
    }

    /// Active (non-archived) assets, in id order.
    pub fn active_assets(&self, tenant_id: TenantId) -> Result<Vec<Asset>, LedgerError> {
        Ok(self
            .book(tenant_id)?
            .assets
            .values()
            .filter(|a| a.is_active())
            .cloned()
            .collect())
    }

    /// Archived assets, in id order.
    pub fn archived_assets(&self, tenant_id: TenantId) -> Result<Vec<Asset>, LedgerError> {
        Ok(self
            .book(tenant_id)?
            .assets
            .values()
            .filter(|a| a.status == AssetStatus::ARCHIVED)
            .cloned()
            .collect())
    }

    /// Look up one asset. Another tenant's asset reads as not found.
    pub fn get_asset(&self, tenant_id: TenantId, asset_id: AssetId) -> Result<Asset, LedgerError> {
        self.book(tenant_id)?
            .assets
            .get(&asset_id)
            .cloned()
            .ok_or_else(|| {
                AssetError::NotFound {
                    asset_id: asset_id.to_string(),
                }
                .into()
            })
    }

    /// Full audit trail for an asset, newest first.
    pub fn asset_history(
        &self,
        tenant_id: TenantId,
        asset_id: AssetId,
    ) -> Result<Vec<ValuationEvent>, LedgerError> {
        // Existence check first so missing assets and foreign assets
        // both read as NotFound.
        self.get_asset(tenant_id, asset_id)?;

        let mut events = self
            .book(tenant_id)?
            .audit
            .get(&asset_id)
            .cloned()
            .unwrap_or_default();
        events.sort_by(|a, b| {
            b.recorded_at
                .cmp(&a.recorded_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        Ok(events)
    }

    /// The tenant's categories, in id order.
    pub fn categories(&self, tenant_id: TenantId) -> Result<Vec<Category>, LedgerError> {
        Ok(self.book(tenant_id)?.categories.values().cloned().collect())
    }

    // ── Internal Helpers ────────────────────────────────────────────

    fn next_sequence(&self) -> u64 {
        self.state.last_sequence + 1
    }

    fn book(&self, tenant_id: TenantId) -> Result<&TenantBook, LedgerError> {
        self.state.tenants.get(&tenant_id).ok_or_else(|| {
            TenantError::NotRegistered {
                tenant_id: tenant_id.to_string(),
            }
            .into()
        })
    }

    /// Journal the event, then apply it to state.
    fn commit(&mut self, event: LedgerEvent) -> Result<(), LedgerError> {
        let sequence = self.next_sequence();

        if let Some(journal) = self.journal.as_mut() {
            let payload = event.encode().map_err(|e| LedgerError::System {
                message: format!("event encoding failed: {}", e),
            })?;
            journal
                .write_event(
                    sequence,
                    event.timestamp(),
                    event.tenant_id(),
                    event.event_type().to_string(),
                    payload,
                )
                .map_err(|e| LedgerError::System {
                    message: format!("journal append failed: {}", e),
                })?;
        }

        self.state.apply(&event)?;
        self.state.last_sequence = sequence;
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────
