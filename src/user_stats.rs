//! User Stats Store - Per-user lending history
//!
//! Counters are created lazily with zero defaults on first reference and are
//! never deleted. Reputation only ever increases; the default count is the
//! single permanent mark of a liquidation.

use odra::prelude::*;
use odra::casper_types::U256;

/// Lending history for a single user
#[odra::odra_type]
#[derive(Default)]
pub struct UserStats {
    /// Loans this user has requested
    pub loans_created: u64,
    /// Loans this user has funded
    pub loans_funded: u64,
    /// Principal volume repaid as a borrower
    pub total_borrowed: U256,
    /// Principal volume supplied as a lender (native loans)
    pub total_lent: U256,
    /// Reputation score, +1 per creation or funding event
    pub reputation: u64,
    /// Number of loans liquidated against this borrower
    pub default_count: u64,
}

/// User Stats Store module
#[odra::module]
pub struct UserStatsStore {
    /// History records by user
    stats: Mapping<Address, UserStats>,
}

#[odra::module]
impl UserStatsStore {
    /// History for a user, all-zero for users never seen
    pub fn stats_of(&self, user: Address) -> UserStats {
        self.stats.get(&user).unwrap_or_default()
    }
}

impl UserStatsStore {
    /// Borrower posted a loan request
    pub fn record_created(&mut self, borrower: &Address) {
        let mut stats = self.stats.get(borrower).unwrap_or_default();
        stats.loans_created += 1;
        stats.reputation += 1;
        self.stats.set(borrower, stats);
    }

    /// Lender funded a request. Lent volume is tracked for native
    /// principals only; token principals move outside contract custody.
    pub fn record_funded(&mut self, lender: &Address, principal: U256, native_principal: bool) {
        let mut stats = self.stats.get(lender).unwrap_or_default();
        stats.loans_funded += 1;
        stats.reputation += 1;
        if native_principal {
            stats.total_lent += principal;
        }
        self.stats.set(lender, stats);
    }

    /// Borrower settled a loan in full
    pub fn record_repaid(&mut self, borrower: &Address, principal: U256) {
        let mut stats = self.stats.get(borrower).unwrap_or_default();
        stats.total_borrowed += principal;
        self.stats.set(borrower, stats);
    }

    /// Borrower defaulted and the loan was liquidated
    pub fn record_liquidated(&mut self, borrower: &Address) {
        let mut stats = self.stats.get(borrower).unwrap_or_default();
        stats.default_count += 1;
        self.stats.set(borrower, stats);
    }
}
