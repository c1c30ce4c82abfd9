//! Risk Engine — orchestrator
//!
//! Combines the class, staleness, concentration and drawdown factors
//! into a single weighted score and band per asset.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::asset::Asset;
use types::category::Category;
use types::ids::AssetId;

use crate::concentration;
use crate::drawdown;
use crate::profile;
use crate::staleness;

/// Risk engine configuration
#[derive(Debug, Clone)]
pub struct RiskEngineConfig {
    /// Weight of the asset-class factor
    pub class_weight: Decimal,
    /// Weight of the valuation-staleness factor
    pub staleness_weight: Decimal,
    /// Weight of the concentration factor
    pub concentration_weight: Decimal,
    /// Weight of the drawdown factor
    pub drawdown_weight: Decimal,
    /// Scores below this band as Low
    pub low_band_max: Decimal,
    /// Scores below this (and >= low_band_max) band as Medium
    pub medium_band_max: Decimal,
}

impl Default for RiskEngineConfig {
    fn default() -> Self {
        // Class risk carries the heaviest weight so speculative asset
        // classes can reach the High band on their own.
        Self {
            class_weight: Decimal::from_str_exact("0.40").unwrap(),
            staleness_weight: Decimal::from_str_exact("0.30").unwrap(),
            concentration_weight: Decimal::from_str_exact("0.20").unwrap(),
            drawdown_weight: Decimal::from_str_exact("0.10").unwrap(),
            low_band_max: Decimal::from_str_exact("3.5").unwrap(),
            medium_band_max: Decimal::from_str_exact("6.0").unwrap(),
        }
    }
}

/// Risk band classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    /// Short label for display surfaces.
    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low",
            RiskBand::Medium => "Med",
            RiskBand::High => "High",
        }
    }

    /// Conventional signal color for the band.
    pub fn color(&self) -> &'static str {
        match self {
            RiskBand::Low => "green",
            RiskBand::Medium => "yellow",
            RiskBand::High => "red",
        }
    }
}

/// Per-asset risk assessment with factor breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub asset_id: AssetId,
    /// Weighted score, rounded to one decimal place
    pub score: Decimal,
    pub band: RiskBand,
    pub class_risk: u8,
    pub staleness_risk: u8,
    pub concentration_risk: Decimal,
    pub drawdown_risk: u8,
}

impl RiskAssessment {
    /// Compact factor breakdown string, e.g. "Class:9 Stale:2 Conc:4.5".
    pub fn factors(&self) -> String {
        format!(
            "Class:{} Stale:{} Conc:{}",
            self.class_risk,
            self.staleness_risk,
            self.concentration_risk.round_dp(1)
        )
    }
}

/// Risk engine service
#[derive(Debug, Clone)]
pub struct RiskEngine {
    config: RiskEngineConfig,
}

impl RiskEngine {
    /// Create a new risk engine with default configuration
    pub fn new() -> Self {
        Self {
            config: RiskEngineConfig::default(),
        }
    }

    /// Create a new risk engine with custom configuration
    pub fn with_config(config: RiskEngineConfig) -> Self {
        Self { config }
    }

    /// Assess one asset against the portfolio it belongs to.
    ///
    /// `portfolio_total` is the summed current value of the tenant's
    /// active assets; `now` is the caller's clock (unix ns), kept
    /// explicit so scoring is reproducible.
    pub fn assess(
        &self,
        asset: &Asset,
        category: Option<&Category>,
        portfolio_total: Decimal,
        now: i64,
    ) -> RiskAssessment {
        let acr = profile::class_risk(category);
        let days = staleness::days_since_valuation(asset.valued_at, now);
        let vsr = staleness::staleness_risk(days);
        let cr = concentration::concentration_risk(asset.current_value, portfolio_total);
        let vp = drawdown::drawdown_risk(asset);

        let raw = self.config.class_weight * Decimal::from(acr)
            + self.config.staleness_weight * Decimal::from(vsr)
            + self.config.concentration_weight * cr
            + self.config.drawdown_weight * Decimal::from(vp);

        RiskAssessment {
            asset_id: asset.asset_id,
            score: raw.round_dp(1),
            band: self.band_for(raw),
            class_risk: acr,
            staleness_risk: vsr,
            concentration_risk: cr,
            drawdown_risk: vp,
        }
    }

    /// Band classification from the unrounded score.
    pub fn band_for(&self, raw_score: Decimal) -> RiskBand {
        if raw_score < self.config.low_band_max {
            RiskBand::Low
        } else if raw_score < self.config.medium_band_max {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new()
    }
}
