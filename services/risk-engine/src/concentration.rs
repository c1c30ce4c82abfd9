//! Concentration factor
//!
//! A single asset dominating the portfolio is a risk regardless of its
//! class. The factor scales linearly with the asset's share of total
//! portfolio value.

use rust_decimal::Decimal;
use types::money::Money;

/// Concentration risk factor on the 0..=10 scale.
///
/// `concentration = (current_value / portfolio_total) × 10`
///
/// Returns zero when the portfolio total is zero (no meaningful share).
pub fn concentration_risk(current_value: Money, portfolio_total: Decimal) -> Decimal {
    if portfolio_total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    current_value.as_decimal() / portfolio_total * Decimal::from(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_portfolio() {
        let cr = concentration_risk(Money::from_u64(50_000), Decimal::from(100_000));
        assert_eq!(cr, Decimal::from(5));
    }

    #[test]
    fn test_whole_portfolio() {
        let cr = concentration_risk(Money::from_u64(100_000), Decimal::from(100_000));
        assert_eq!(cr, Decimal::from(10));
    }

    #[test]
    fn test_small_share() {
        let cr = concentration_risk(Money::from_u64(1_000), Decimal::from(100_000));
        assert_eq!(cr, Decimal::from_str_exact("0.1").unwrap());
    }

    #[test]
    fn test_empty_portfolio() {
        let cr = concentration_risk(Money::from_u64(5_000), Decimal::ZERO);
        assert_eq!(cr, Decimal::ZERO);
    }
}
