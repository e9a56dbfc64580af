//! Mathematical utilities for the lending ledger
//! Implements basis-point ratios and the proportional interest formula
use odra::casper_types::{U256, U512};

/// Basis-point denominator (10000 bps = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Collateral ratio at which the over-collateralization discount applies (200%)
pub const DISCOUNT_RATIO_BPS: u64 = 20_000;

/// Rate discount for heavily over-collateralized loans
pub const DISCOUNT_BPS: u64 = 50;

/// Interest accrues only for rates within [MIN_ACCRUAL_RATE_BPS, MAX_ACCRUAL_RATE_BPS]
pub const MIN_ACCRUAL_RATE_BPS: u64 = 100;

/// Upper bound of the accrual window (100%)
pub const MAX_ACCRUAL_RATE_BPS: u64 = 10_000;

/// Basis-point math for ratios, interest, and fees
pub struct BpsMath;

impl BpsMath {
    /// Collateral ratio scaled by 10000: collateral * 10000 / principal
    /// None when principal is zero or the scaling multiply overflows
    pub fn ratio_bps(collateral: U256, principal: U256) -> Option<U256> {
        if principal.is_zero() {
            return None;
        }
        collateral
            .checked_mul(U256::from(BPS_DENOMINATOR))
            .map(|scaled| scaled / principal)
    }

    /// Utilization rate scaled by 10000: borrowed * 10000 / supplied
    /// Returns zero when nothing has been supplied
    pub fn utilization_bps(borrowed: U256, supplied: U256) -> U256 {
        if supplied.is_zero() {
            return U256::zero();
        }
        borrowed * U256::from(BPS_DENOMINATOR) / supplied
    }

    /// Time-proportional simple interest, truncating toward zero at each
    /// division step.
    ///
    /// annual = principal * rate / 10000
    /// time_factor = elapsed * 10000 / duration
    /// interest = annual * time_factor / 10000
    ///
    /// Fails closed (returns zero) for zero principal, zero duration, or a
    /// rate outside the accrual window. Elapsed time past the duration keeps
    /// scaling linearly, so late repayment accrues extra interest.
    pub fn proportional_interest(
        principal: U256,
        rate_bps: u64,
        elapsed: u64,
        duration: u64,
    ) -> U256 {
        if principal.is_zero() || duration == 0 {
            return U256::zero();
        }
        if !(MIN_ACCRUAL_RATE_BPS..=MAX_ACCRUAL_RATE_BPS).contains(&rate_bps) {
            return U256::zero();
        }

        let denominator = U256::from(BPS_DENOMINATOR);
        let annual = principal * U256::from(rate_bps) / denominator;
        let time_factor = U256::from(elapsed) * denominator / U256::from(duration);
        annual * time_factor / denominator
    }

    /// Platform fee cut: amount * fee_bps / 10000, truncating
    pub fn fee_cut(amount: U256, fee_bps: u64) -> U256 {
        amount * U256::from(fee_bps) / U256::from(BPS_DENOMINATOR)
    }
}

/// Conversions between ledger amounts and native motes at the transfer boundary
pub struct Motes;

impl Motes {
    /// Widen a ledger amount to the native transfer width
    pub fn to_u512(amount: U256) -> U512 {
        U512::from(amount.as_u128())
    }

    /// Narrow an attached native value to the ledger width
    pub fn to_u256(amount: U512) -> U256 {
        U256::from(amount.as_u128())
    }
}
