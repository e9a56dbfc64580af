//! Interest Rate Engine - Dynamic per-loan rate model
//!
//! A loan's rate is assembled from four signals:
//! - Base rate: platform-wide floor component
//! - Utilization adjustment: live demand against supply for the loan asset
//! - Risk adjustment: borrower tier times the risk multiplier
//! - Collateral discount: flat reduction for heavily over-collateralized loans
//!
//! The result is clamped to the configured [min, max] window.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::LendingError;
use crate::math::{BPS_DENOMINATOR, DISCOUNT_BPS, DISCOUNT_RATIO_BPS};
use crate::risk::RiskTier;

const BASE_RATE_MIN_BPS: u64 = 50;
const BASE_RATE_MAX_BPS: u64 = 1_000;
const UTILIZATION_MULTIPLIER_CAP_BPS: u64 = 500;
const RISK_MULTIPLIER_CAP_BPS: u64 = 300;
const MAX_RATE_FLOOR_BPS: u64 = 500;
const MAX_RATE_CAP_BPS: u64 = 5_000;
const MIN_RATE_FLOOR_BPS: u64 = 50;
const MIN_RATE_CAP_BPS: u64 = 200;

/// Dynamic rate parameters, all in basis points
#[odra::odra_type]
pub struct RateParams {
    /// Platform-wide base rate
    pub base_rate_bps: u64,
    /// Scales the utilization rate's contribution
    pub utilization_multiplier_bps: u64,
    /// Added once per risk tier step
    pub risk_multiplier_bps: u64,
    /// Upper clamp for every computed rate
    pub max_rate_bps: u64,
    /// Lower clamp for every computed rate
    pub min_rate_bps: u64,
}

impl Default for RateParams {
    fn default() -> Self {
        Self {
            base_rate_bps: 500,
            utilization_multiplier_bps: 200,
            risk_multiplier_bps: 100,
            max_rate_bps: 2_000,
            min_rate_bps: 100,
        }
    }
}

impl RateParams {
    /// Bounds accepted by the rate-parameter admin update
    pub fn validate(&self) -> Result<(), LendingError> {
        if !(BASE_RATE_MIN_BPS..=BASE_RATE_MAX_BPS).contains(&self.base_rate_bps) {
            return Err(LendingError::InvalidInterest);
        }
        if self.utilization_multiplier_bps > UTILIZATION_MULTIPLIER_CAP_BPS {
            return Err(LendingError::InvalidInterest);
        }
        if self.risk_multiplier_bps > RISK_MULTIPLIER_CAP_BPS {
            return Err(LendingError::InvalidInterest);
        }
        if !(MAX_RATE_FLOOR_BPS..=MAX_RATE_CAP_BPS).contains(&self.max_rate_bps) {
            return Err(LendingError::InvalidInterest);
        }
        if !(MIN_RATE_FLOOR_BPS..=MIN_RATE_CAP_BPS).contains(&self.min_rate_bps) {
            return Err(LendingError::InvalidInterest);
        }
        if self.max_rate_bps <= self.min_rate_bps {
            return Err(LendingError::InvalidInterest);
        }
        Ok(())
    }
}

/// Interest Rate Engine module
#[odra::module]
pub struct InterestRateEngine {
    /// Rate parameters
    params: Var<RateParams>,
}

#[odra::module]
impl InterestRateEngine {
    /// Install the default rate parameters
    pub fn init(&mut self) {
        self.params.set(RateParams::default());
    }

    /// Current rate parameters
    pub fn rate_params(&self) -> RateParams {
        self.params.get_or_default()
    }

    /// Replace the rate parameters, enforcing the admin bounds
    pub fn set_params(&mut self, params: RateParams) {
        if let Err(error) = params.validate() {
            self.env().revert(error);
        }
        self.params.set(params);
    }
}

impl InterestRateEngine {
    /// Compute the dynamic rate for a prospective loan:
    ///
    /// raw = base
    ///     + utilization_bps * utilization_multiplier / 10000
    ///     + tier * risk_multiplier
    ///     - 50 if collateral_ratio_bps >= 20000
    /// result = clamp(raw, min, max)
    pub fn dynamic_rate(
        &self,
        utilization_bps: U256,
        tier: RiskTier,
        collateral_ratio_bps: U256,
    ) -> u64 {
        let params = self.params.get_or_default();

        let utilization_adj = utilization_bps * U256::from(params.utilization_multiplier_bps)
            / U256::from(BPS_DENOMINATOR);
        let risk_adj = U256::from(u64::from(tier.as_u8()) * params.risk_multiplier_bps);
        let mut rate = U256::from(params.base_rate_bps) + utilization_adj + risk_adj;

        if collateral_ratio_bps >= U256::from(DISCOUNT_RATIO_BPS) {
            rate = rate.saturating_sub(U256::from(DISCOUNT_BPS));
        }

        let min = U256::from(params.min_rate_bps);
        let max = U256::from(params.max_rate_bps);
        if rate < min {
            rate = min;
        }
        if rate > max {
            rate = max;
        }
        rate.as_u64()
    }

    /// Explicit borrower-chosen rates must sit inside the same window the
    /// dynamic rate is clamped to
    pub fn ensure_rate_in_bounds(&self, rate_bps: u64) {
        let params = self.params.get_or_default();
        if rate_bps < params.min_rate_bps || rate_bps > params.max_rate_bps {
            self.env().revert(LendingError::InvalidInterest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = RateParams::default();
        assert_eq!(params.base_rate_bps, 500);
        assert_eq!(params.utilization_multiplier_bps, 200);
        assert_eq!(params.risk_multiplier_bps, 100);
        assert_eq!(params.max_rate_bps, 2_000);
        assert_eq!(params.min_rate_bps, 100);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate_base_rate_bounds() {
        let mut params = RateParams::default();
        params.base_rate_bps = 49;
        assert!(params.validate().is_err());
        params.base_rate_bps = 50;
        assert!(params.validate().is_ok());
        params.base_rate_bps = 1_000;
        assert!(params.validate().is_ok());
        params.base_rate_bps = 1_001;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_multiplier_caps() {
        let mut params = RateParams::default();
        params.utilization_multiplier_bps = 500;
        assert!(params.validate().is_ok());
        params.utilization_multiplier_bps = 501;
        assert!(params.validate().is_err());

        let mut params = RateParams::default();
        params.risk_multiplier_bps = 300;
        assert!(params.validate().is_ok());
        params.risk_multiplier_bps = 301;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_validate_rate_window() {
        let mut params = RateParams::default();
        params.max_rate_bps = 499;
        assert!(params.validate().is_err());
        params.max_rate_bps = 5_001;
        assert!(params.validate().is_err());

        let mut params = RateParams::default();
        params.min_rate_bps = 49;
        assert!(params.validate().is_err());
        params.min_rate_bps = 201;
        assert!(params.validate().is_err());

        // narrowest legal window
        let params = RateParams {
            base_rate_bps: 500,
            utilization_multiplier_bps: 200,
            risk_multiplier_bps: 100,
            max_rate_bps: 500,
            min_rate_bps: 200,
        };
        assert!(params.validate().is_ok());
    }
}
