//! Events for the lending ledger

use odra::prelude::*;
use odra::casper_types::U256;

// ============================================================================
// Loan Lifecycle Events
// ============================================================================

/// Event emitted when a loan request is created
#[odra::event]
pub struct LoanCreated {
    /// Loan identifier
    pub loan_id: u64,
    /// Address that requested the loan
    pub borrower: Address,
    /// Requested principal
    pub principal: U256,
    /// Collateral value locked against the loan
    pub collateral_amount: U256,
    /// Effective interest rate in basis points
    pub interest_rate_bps: u64,
    /// Loan duration in milliseconds
    pub duration: u64,
    /// Borrower risk tier at creation
    pub risk_tier: u8,
    /// Timestamp of creation
    pub timestamp: u64,
}

/// Event emitted when a pending loan is funded
#[odra::event]
pub struct LoanFunded {
    /// Loan identifier
    pub loan_id: u64,
    /// Address that funded the loan
    pub lender: Address,
    /// Borrower receiving the principal
    pub borrower: Address,
    /// Principal transferred
    pub principal: U256,
    /// Timestamp of funding
    pub timestamp: u64,
}

/// Event emitted when an active loan is repaid
#[odra::event]
pub struct LoanRepaid {
    /// Loan identifier
    pub loan_id: u64,
    /// Borrower that repaid
    pub borrower: Address,
    /// Total amount paid (principal + interest)
    pub total_paid: U256,
    /// Interest portion of the payment
    pub interest: U256,
    /// Platform fee taken from the payment
    pub fee: U256,
    /// Timestamp of repayment
    pub timestamp: u64,
}

/// Event emitted when an overdue loan is liquidated
#[odra::event]
pub struct LoanLiquidated {
    /// Loan identifier
    pub loan_id: u64,
    /// Lender that seized the collateral
    pub lender: Address,
    /// Borrower that defaulted
    pub borrower: Address,
    /// Collateral value seized
    pub collateral_amount: U256,
    /// Timestamp of liquidation
    pub timestamp: u64,
}

// ============================================================================
// Asset Registry Events
// ============================================================================

/// Event emitted when a fungible token is whitelisted
#[odra::event]
pub struct TokenAdded {
    /// Token contract address
    pub contract: Address,
    /// Token decimal precision
    pub decimals: u8,
    /// Assigned risk score
    pub risk_score: u8,
    /// Added by
    pub added_by: Address,
}

/// Event emitted when a fungible token is disabled
#[odra::event]
pub struct TokenRemoved {
    /// Token contract address
    pub contract: Address,
    /// Removed by
    pub removed_by: Address,
}

/// Event emitted when a collectible collection is whitelisted
#[odra::event]
pub struct CollectionAdded {
    /// Collection contract address
    pub collection: Address,
    /// Floor price used for collateral valuation
    pub floor_price: U256,
    /// Assigned risk score
    pub risk_score: u8,
    /// Added by
    pub added_by: Address,
}

/// Event emitted when a collection's listing is updated
#[odra::event]
pub struct CollectionUpdated {
    /// Collection contract address
    pub collection: Address,
    /// New floor price
    pub floor_price: U256,
    /// Whether the collection is enabled
    pub enabled: bool,
    /// Updated by
    pub updated_by: Address,
}

// ============================================================================
// Configuration Events
// ============================================================================

/// Event emitted when the platform fee is updated
#[odra::event]
pub struct PlatformFeeUpdated {
    /// Old fee in basis points
    pub old_fee_bps: u64,
    /// New fee in basis points
    pub new_fee_bps: u64,
    /// Updated by
    pub updated_by: Address,
}

/// Event emitted when the minimum collateral ratio is updated
#[odra::event]
pub struct MinCollateralRatioUpdated {
    /// Old ratio in basis points
    pub old_ratio_bps: u64,
    /// New ratio in basis points
    pub new_ratio_bps: u64,
    /// Updated by
    pub updated_by: Address,
}

/// Event emitted when the dynamic rate parameters are updated
#[odra::event]
pub struct RateParamsUpdated {
    /// Base rate in basis points
    pub base_rate_bps: u64,
    /// Utilization multiplier in basis points
    pub utilization_multiplier_bps: u64,
    /// Risk multiplier in basis points
    pub risk_multiplier_bps: u64,
    /// Upper rate bound in basis points
    pub max_rate_bps: u64,
    /// Lower rate bound in basis points
    pub min_rate_bps: u64,
    /// Updated by
    pub updated_by: Address,
}

// ============================================================================
// Admin Events
// ============================================================================

/// Event emitted when the platform is paused
#[odra::event]
pub struct ContractPaused {
    /// Address that paused
    pub paused_by: Address,
    /// Timestamp
    pub timestamp: u64,
}

/// Event emitted when the platform is unpaused
#[odra::event]
pub struct ContractUnpaused {
    /// Address that unpaused
    pub unpaused_by: Address,
    /// Timestamp
    pub timestamp: u64,
}

/// Event emitted when platform ownership changes hands
#[odra::event]
pub struct OwnershipTransferred {
    /// Previous owner
    pub old_owner: Address,
    /// New owner
    pub new_owner: Address,
}
