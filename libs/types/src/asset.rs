//! Asset lifecycle types
//!
//! An asset belongs to exactly one tenant, carries a current valuation,
//! and is archived ("soft deleted") rather than destroyed so its audit
//! trail survives.

use crate::ids::{AssetId, CategoryId, TenantId};
use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Asset lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetStatus {
    /// Visible in active views and portfolio aggregates
    ACTIVE,
    /// Soft deleted: hidden from active views, history preserved
    ARCHIVED,
}

/// An illiquid alternative asset tracked for one tenant.
///
/// Invariant: `current_value` only changes through `revalue`, which also
/// advances `valued_at`; metadata edits never touch either field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub asset_id: AssetId,
    pub tenant_id: TenantId,
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub purchase_price: Money,
    /// Unix nanosecond timestamp of the purchase.
    pub purchase_date: i64,
    pub current_value: Money,
    /// Unix nanosecond timestamp of the last revaluation.
    /// Drives valuation-staleness risk.
    pub valued_at: i64,
    pub status: AssetStatus,
    pub created_at: i64,
    pub updated_at: i64,
    pub version: u64,
}

impl Asset {
    /// Create a new active asset.
    ///
    /// The initial valuation equals the purchase price.
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        category_id: Option<CategoryId>,
        purchase_price: Money,
        purchase_date: i64,
        timestamp: i64,
    ) -> Self {
        Self {
            asset_id: AssetId::new(),
            tenant_id,
            name: name.into(),
            category_id,
            purchase_price,
            purchase_date,
            current_value: purchase_price,
            valued_at: timestamp,
            status: AssetStatus::ACTIVE,
            created_at: timestamp,
            updated_at: timestamp,
            version: 0,
        }
    }

    /// Check if the asset is active (not archived).
    pub fn is_active(&self) -> bool {
        matches!(self.status, AssetStatus::ACTIVE)
    }

    /// Apply a new market valuation.
    pub fn revalue(&mut self, new_value: Money, timestamp: i64) {
        self.current_value = new_value;
        self.valued_at = timestamp;
        self.touch(timestamp);
    }

    /// Edit metadata (name, category). Does not affect the valuation.
    pub fn edit(
        &mut self,
        name: impl Into<String>,
        category_id: Option<CategoryId>,
        timestamp: i64,
    ) {
        self.name = name.into();
        self.category_id = category_id;
        self.touch(timestamp);
    }

    /// Archive the asset (soft delete).
    ///
    /// # Panics
    /// Panics if the asset is already archived.
    pub fn archive(&mut self, timestamp: i64) {
        assert!(self.is_active(), "Asset already archived");
        self.status = AssetStatus::ARCHIVED;
        self.touch(timestamp);
    }

    /// Restore a previously archived asset.
    ///
    /// # Panics
    /// Panics if the asset is not archived.
    pub fn restore(&mut self, timestamp: i64) {
        assert!(!self.is_active(), "Asset is not archived");
        self.status = AssetStatus::ACTIVE;
        self.touch(timestamp);
    }

    /// Detach the asset from its category.
    pub fn detach_category(&mut self, timestamp: i64) {
        self.category_id = None;
        self.touch(timestamp);
    }

    /// Signed unrealized gain: `current_value - purchase_price`.
    pub fn unrealized_gain(&self) -> Decimal {
        self.current_value.signed_diff(self.purchase_price)
    }

    /// Fractional return since purchase, None if purchase price is zero.
    pub fn return_fraction(&self) -> Option<Decimal> {
        if self.purchase_price.is_zero() {
            return None;
        }
        Some(self.unrealized_gain() / self.purchase_price.as_decimal())
    }

    fn touch(&mut self, timestamp: i64) {
        self.updated_at = timestamp;
        self.version += 1;
    }
}
