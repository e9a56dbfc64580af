//! Risk Scorer - Borrower risk tiers derived from lending history

use odra::prelude::*;
use crate::asset_registry::AssetClass;
use crate::user_stats::UserStats;

/// Reputation at or above this grades a borrower Safe
const SAFE_REPUTATION: u64 = 10;

/// Reputation at or above this grades a borrower Low risk
const LOW_REPUTATION: u64 = 5;

/// More than this many defaults grades a borrower VeryHigh
const VERY_HIGH_DEFAULTS: u64 = 2;

/// Ordinal risk grade, 1 (Safe) to 5 (VeryHigh). The numeric value feeds
/// the dynamic rate's risk adjustment directly.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RiskTier {
    Safe = 1,
    Low = 2,
    Medium = 3,
    High = 4,
    VeryHigh = 5,
}

impl RiskTier {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Grade a borrower from their history.
///
/// Borrowers with no prior loans default to Medium. Any default pushes the
/// grade to High, more than two to VeryHigh; with a clean record, reputation
/// earns the Safe and Low grades. The collateral parameters are accepted as
/// future grading inputs and currently do not affect the result.
pub fn score_borrower(
    stats: &UserStats,
    _collateral_class: AssetClass,
    _collateral_contract: Option<Address>,
) -> RiskTier {
    if stats.loans_created == 0 {
        return RiskTier::Medium;
    }
    if stats.default_count > VERY_HIGH_DEFAULTS {
        return RiskTier::VeryHigh;
    }
    if stats.default_count > 0 {
        return RiskTier::High;
    }
    if stats.reputation >= SAFE_REPUTATION {
        return RiskTier::Safe;
    }
    if stats.reputation >= LOW_REPUTATION {
        return RiskTier::Low;
    }
    RiskTier::Medium
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(loans_created: u64, reputation: u64, default_count: u64) -> UserStats {
        UserStats {
            loans_created,
            reputation,
            default_count,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_borrower_is_medium() {
        let tier = score_borrower(&history(0, 0, 0), AssetClass::Native, None);
        assert_eq!(tier, RiskTier::Medium);
        // reputation earned through funding alone does not lift the
        // new-borrower default
        let tier = score_borrower(&history(0, 12, 0), AssetClass::Native, None);
        assert_eq!(tier, RiskTier::Medium);
    }

    #[test]
    fn test_defaults_dominate_reputation() {
        let tier = score_borrower(&history(10, 20, 1), AssetClass::Native, None);
        assert_eq!(tier, RiskTier::High);
        let tier = score_borrower(&history(10, 20, 3), AssetClass::Native, None);
        assert_eq!(tier, RiskTier::VeryHigh);
    }

    #[test]
    fn test_default_count_boundary() {
        // exactly two defaults is still High, three crosses to VeryHigh
        let tier = score_borrower(&history(5, 5, 2), AssetClass::Native, None);
        assert_eq!(tier, RiskTier::High);
        let tier = score_borrower(&history(5, 5, 3), AssetClass::Native, None);
        assert_eq!(tier, RiskTier::VeryHigh);
    }

    #[test]
    fn test_reputation_grades() {
        let tier = score_borrower(&history(3, 10, 0), AssetClass::Native, None);
        assert_eq!(tier, RiskTier::Safe);
        let tier = score_borrower(&history(3, 5, 0), AssetClass::Native, None);
        assert_eq!(tier, RiskTier::Low);
        let tier = score_borrower(&history(3, 4, 0), AssetClass::Native, None);
        assert_eq!(tier, RiskTier::Medium);
    }

    #[test]
    fn test_tier_values() {
        assert_eq!(RiskTier::Safe.as_u8(), 1);
        assert_eq!(RiskTier::Low.as_u8(), 2);
        assert_eq!(RiskTier::Medium.as_u8(), 3);
        assert_eq!(RiskTier::High.as_u8(), 4);
        assert_eq!(RiskTier::VeryHigh.as_u8(), 5);
    }
}
