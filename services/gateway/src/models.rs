//! Request and response shapes for the `/v1` API.
//!
//! Monetary amounts travel as decimal strings ("8500", "850.25");
//! timestamps in request bodies are unix nanoseconds, timestamps in
//! audit responses are RFC 3339.

use risk_engine::engine::{RiskAssessment, RiskBand};
use risk_engine::summary::PortfolioSummary;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::asset::Asset;
use types::category::Category;
use types::ids::{AssetId, CategoryId, EventId, TenantId};
use types::money::Money;
use types::valuation::ValuationEvent;

#[derive(Debug, Clone, Serialize)]
pub struct RegisterTenantResponse {
    pub tenant_id: TenantId,
    /// The default asset-class profile seeded at registration.
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssetRequest {
    pub name: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub purchase_price: Money,
    /// Unix nanosecond timestamp of the purchase.
    pub purchase_date: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAssetRequest {
    pub name: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub current_value: Money,
    /// Recorded on the audit event when the value changes.
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchiveAssetRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    /// Inherent asset-class risk, 1..=10.
    pub base_risk_score: u8,
}

/// An active asset together with its current risk assessment.
#[derive(Debug, Clone, Serialize)]
pub struct AssetView {
    pub asset: Asset,
    pub risk: RiskAssessment,
}

/// One entry of an asset's audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub event_id: EventId,
    pub sequence: u64,
    pub kind: String,
    pub old_value: Money,
    pub new_value: Money,
    /// Signed value change captured by the event.
    pub delta: Decimal,
    pub note: Option<String>,
    /// RFC 3339 timestamp of the change.
    pub recorded_at: String,
}

impl From<ValuationEvent> for HistoryEntry {
    fn from(event: ValuationEvent) -> Self {
        let delta = event.delta();
        let recorded_at = event.recorded_at_rfc3339();
        Self {
            event_id: event.event_id,
            sequence: event.sequence,
            kind: event.kind.as_str().to_string(),
            old_value: event.old_value,
            new_value: event.new_value,
            delta,
            note: event.note,
            recorded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioResponse {
    pub summary: PortfolioSummary,
    pub assets: Vec<PortfolioAsset>,
}

/// Per-asset line of the portfolio view.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioAsset {
    pub asset_id: AssetId,
    pub name: String,
    pub current_value: Money,
    pub unrealized_gain: Decimal,
    pub score: Decimal,
    pub band: RiskBand,
    pub factors: String,
}
