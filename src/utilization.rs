//! Utilization Tracker - Per-asset supply/demand accounting
//!
//! Keeps running totals of supplied and borrowed value plus the active loan
//! count for every asset the ledger has seen. The totals feed the dynamic
//! rate engine through the utilization rate.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::asset_registry::{AssetClass, LoanAsset};
use crate::math::BpsMath;

/// Running totals for a single asset
#[odra::odra_type]
#[derive(Default)]
pub struct AssetUtilization {
    /// Total value supplied by lenders
    pub total_supplied: U256,
    /// Total value requested by borrowers
    pub total_borrowed: U256,
    /// Number of loans not yet repaid or liquidated
    pub active_loans: u64,
}

impl AssetUtilization {
    /// Demand side of a new loan request
    pub fn record_created(&mut self, principal: U256) {
        self.total_borrowed += principal;
        self.active_loans += 1;
    }

    /// Supply side, recorded at funding
    pub fn record_funded(&mut self, principal: U256) {
        self.total_supplied += principal;
    }

    /// Settlement retires the borrowed total and the active count; the
    /// supplied total keeps the cumulative funded volume. Decrements are
    /// floor-clamped at zero, never underflowing regardless of order.
    pub fn record_closed(&mut self, principal: U256) {
        self.total_borrowed = self.total_borrowed.saturating_sub(principal);
        self.active_loans = self.active_loans.saturating_sub(1);
    }
}

/// Utilization Tracker module
#[odra::module]
pub struct UtilizationTracker {
    /// Totals keyed by (asset kind, optional contract reference)
    assets: Mapping<(AssetClass, Option<Address>), AssetUtilization>,
}

#[odra::module]
impl UtilizationTracker {
    /// Current totals for an asset, zero for assets never touched
    pub fn snapshot(&self, class: AssetClass, asset_contract: Option<Address>) -> AssetUtilization {
        self.assets.get(&(class, asset_contract)).unwrap_or_default()
    }

    /// Utilization rate in basis points: borrowed * 10000 / supplied,
    /// zero while nothing has been supplied
    pub fn utilization_bps(&self, class: AssetClass, asset_contract: Option<Address>) -> U256 {
        let totals = self.snapshot(class, asset_contract);
        BpsMath::utilization_bps(totals.total_borrowed, totals.total_supplied)
    }
}

impl UtilizationTracker {
    /// Borrowed total and loan count rise as soon as the request is posted,
    /// so unfunded demand already moves the dynamic rate.
    pub fn on_loan_created(&mut self, asset: &LoanAsset, principal: U256) {
        let key = Self::key_of(asset);
        let mut totals = self.assets.get(&key).unwrap_or_default();
        totals.record_created(principal);
        self.assets.set(&key, totals);
    }

    /// Supply side: recorded when a lender funds the request
    pub fn on_loan_funded(&mut self, asset: &LoanAsset, principal: U256) {
        let key = Self::key_of(asset);
        let mut totals = self.assets.get(&key).unwrap_or_default();
        totals.record_funded(principal);
        self.assets.set(&key, totals);
    }

    /// Repayment and liquidation share the same settlement bookkeeping
    pub fn on_loan_closed(&mut self, asset: &LoanAsset, principal: U256) {
        let key = Self::key_of(asset);
        let mut totals = self.assets.get(&key).unwrap_or_default();
        totals.record_closed(principal);
        self.assets.set(&key, totals);
    }

    /// Utilization rate for a loan asset
    pub fn utilization_for(&self, asset: &LoanAsset) -> U256 {
        self.utilization_bps(asset.class(), asset.contract())
    }

    fn key_of(asset: &LoanAsset) -> (AssetClass, Option<Address>) {
        (asset.class(), asset.contract())
    }
}
