//! Drawdown (volatility/loss proxy) factor
//!
//! Without a price history there is no direct volatility measure; a deep
//! unrealized loss is the proxy. An asset more than 20% under water gets
//! a fixed penalty, everything else none.

use rust_decimal::Decimal;
use types::asset::Asset;

/// Factor applied when the asset is in heavy drawdown.
pub const DRAWDOWN_PENALTY: u8 = 5;

/// Return threshold below which the penalty applies (-20%).
pub fn loss_threshold() -> Decimal {
    Decimal::from_str_exact("-0.20").unwrap()
}

/// Drawdown risk factor for an asset.
///
/// Assets with a zero purchase price have no meaningful return and are
/// never penalised.
pub fn drawdown_risk(asset: &Asset) -> u8 {
    match asset.return_fraction() {
        Some(r) if r < loss_threshold() => DRAWDOWN_PENALTY,
        _ => 0,
    }
}
