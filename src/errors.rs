//! Error types for the lending ledger

use odra::prelude::*;

/// Errors that can occur in the lending ledger
#[odra::odra_error]
pub enum LendingError {
    // Lookup Errors
    /// Loan id outside the valid range, or asset reference never registered
    NotFound = 1,
    /// Caller is not the required principal for this action
    Unauthorized = 2,

    // Loan Parameter Errors
    /// Zero or malformed numeric input
    InvalidAmount = 3,
    /// Duration is zero or exceeds the platform maximum
    InvalidDuration = 4,
    /// Interest rate outside the configured bounds
    InvalidInterest = 5,
    /// Risk score outside the accepted range
    InvalidRiskScore = 6,
    /// Collateral ratio below the platform minimum
    InsufficientCollateral = 7,

    // Lifecycle Errors
    /// Loan is not in the Active state
    LoanNotActive = 8,
    /// Loan has not been funded yet
    LoanNotFunded = 9,
    /// Loan already has a lender
    AlreadyFunded = 10,
    /// Loan duration has not elapsed yet
    LoanNotOverdue = 11,

    // Asset Registry Errors
    /// Asset is registered but disabled, or the entry point does not
    /// handle this asset kind
    UnsupportedAsset = 12,
    /// Collateral kind not accepted for this operation
    InvalidCollateralType = 13,
    /// Referenced address is not a contract
    InvalidTokenContract = 14,

    // Rate Engine Errors
    /// Dynamic rate exceeds the borrower's acceptable ceiling
    RateRejected = 15,

    // Platform Errors
    /// Platform is paused
    PlatformPaused = 16,
}
