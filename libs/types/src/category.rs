//! Asset-class categories
//!
//! Each tenant owns its own category set. A category carries the inherent
//! risk of its asset class (1 = safest, 10 = most speculative), consumed
//! by the risk engine as the asset-class factor.

use crate::ids::{CategoryId, TenantId};
use serde::{Deserialize, Serialize};

/// Lowest valid base risk score.
pub const MIN_CLASS_RISK: u8 = 1;
/// Highest valid base risk score.
pub const MAX_CLASS_RISK: u8 = 10;

/// A per-tenant asset-class tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub tenant_id: TenantId,
    pub name: String,
    /// Inherent asset-class risk, clamped to 1..=10.
    pub base_risk_score: u8,
    pub created_at: i64,
}

impl Category {
    /// Create a new category, clamping the risk score into range.
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        base_risk_score: u8,
        timestamp: i64,
    ) -> Self {
        Self {
            category_id: CategoryId::new(),
            tenant_id,
            name: name.into(),
            base_risk_score: base_risk_score.clamp(MIN_CLASS_RISK, MAX_CLASS_RISK),
            created_at: timestamp,
        }
    }
}

/// Default asset-class profile seeded for every new tenant.
///
/// | Class            | Risk |
/// |------------------|------|
/// | NFTs             | 10   |
/// | Crypto           | 9    |
/// | Startups         | 8    |
/// | Sneakers         | 7    |
/// | Trading Cards    | 6    |
/// | Art              | 5    |
/// | Wine             | 4    |
/// | Watches          | 3    |
/// | Real Estate      | 2    |
/// | Cash Equivalents | 1    |
pub fn default_profile() -> Vec<(&'static str, u8)> {
    vec![
        ("NFTs", 10),
        ("Crypto", 9),
        ("Startups", 8),
        ("Sneakers", 7),
        ("Trading Cards", 6),
        ("Art", 5),
        ("Wine", 4),
        ("Watches", 3),
        ("Real Estate", 2),
        ("Cash Equivalents", 1),
    ]
}
