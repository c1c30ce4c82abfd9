//! Asset-class risk factor
//!
//! The class factor is simply the category's base risk score; assets
//! without a category fall back to the middle of the scale.

use types::category::Category;

/// Class risk assumed for uncategorised assets.
pub const DEFAULT_CLASS_RISK: u8 = 5;

/// Resolve the asset-class risk factor for an asset's category.
pub fn class_risk(category: Option<&Category>) -> u8 {
    category
        .map(|c| c.base_risk_score)
        .unwrap_or(DEFAULT_CLASS_RISK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::TenantId;

    const T0: i64 = 1_708_123_456_789_000_000;

    #[test]
    fn test_class_risk_from_category() {
        let cat = Category::new(TenantId::new(), "Crypto", 9, T0);
        assert_eq!(class_risk(Some(&cat)), 9);
    }

    #[test]
    fn test_class_risk_uncategorised() {
        assert_eq!(class_risk(None), DEFAULT_CLASS_RISK);
    }
}
