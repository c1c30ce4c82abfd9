//! Portfolio aggregates
//!
//! Deterministic totals over a tenant's active assets, plus the combined
//! per-asset assessment pass used by the dashboard surface.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::asset::Asset;
use types::category::Category;

use crate::engine::{RiskAssessment, RiskEngine};

/// Aggregate figures over a set of active assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Σ purchase_price
    pub total_cost: Decimal,
    /// Σ current_value
    pub total_value: Decimal,
    /// total_value - total_cost (may be negative)
    pub unrealized_gain: Decimal,
    pub asset_count: usize,
}

/// Total current value across assets.
///
/// `total_value = Σ asset.current_value`
pub fn total_value(assets: &[Asset]) -> Decimal {
    assets.iter().fold(Decimal::ZERO, |acc, a| {
        acc + a.current_value.as_decimal()
    })
}

/// Total acquisition cost across assets.
///
/// `total_cost = Σ asset.purchase_price`
pub fn total_cost(assets: &[Asset]) -> Decimal {
    assets.iter().fold(Decimal::ZERO, |acc, a| {
        acc + a.purchase_price.as_decimal()
    })
}

/// Build the aggregate summary for a set of assets.
///
/// Callers are expected to pass active assets only; archived assets are
/// excluded from every aggregate by the store's queries.
pub fn summarize(assets: &[Asset]) -> PortfolioSummary {
    let cost = total_cost(assets);
    let value = total_value(assets);
    PortfolioSummary {
        total_cost: cost,
        total_value: value,
        unrealized_gain: value - cost,
        asset_count: assets.len(),
    }
}

/// Assess every asset against the shared portfolio total.
///
/// Category lookup is by id over the tenant's category set; assets whose
/// category has been deleted fall back to the default class risk.
pub fn assess_portfolio(
    engine: &RiskEngine,
    assets: &[Asset],
    categories: &[Category],
    now: i64,
) -> Vec<RiskAssessment> {
    let total = total_value(assets);
    assets
        .iter()
        .map(|asset| {
            let category = asset
                .category_id
                .and_then(|id| categories.iter().find(|c| c.category_id == id));
            engine.assess(asset, category, total, now)
        })
        .collect()
}
