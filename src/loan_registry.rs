//! Loan Registry - Peer-to-peer lending state machine
//!
//! Owns the loan records and drives every lifecycle transition:
//! Pending -> Active -> Repaid or Liquidated. Each entry point validates
//! fully before any state is written, moves native value through the
//! contract's purse, then commits the loan, utilization, and user-stat
//! updates together.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::asset_registry::{AssetClass, AssetRegistry, Collateral, LoanAsset, SupportedCollection, SupportedToken};
use crate::errors::LendingError;
use crate::events::*;
use crate::interest_rate::{InterestRateEngine, RateParams};
use crate::math::{BpsMath, Motes};
use crate::risk;
use crate::user_stats::{UserStats, UserStatsStore};
use crate::utilization::{AssetUtilization, UtilizationTracker};

/// Platform fee ceiling (10%)
pub const MAX_PLATFORM_FEE_BPS: u64 = 1_000;

/// Collateral ratios below 100% are never accepted
pub const MIN_COLLATERAL_RATIO_FLOOR_BPS: u64 = 10_000;

/// Default minimum collateral ratio (150%)
pub const DEFAULT_MIN_COLLATERAL_RATIO_BPS: u64 = 15_000;

/// Default maximum loan duration: one year of block time (ms)
pub const DEFAULT_MAX_LOAN_DURATION: u64 = 31_536_000_000;

/// Lifecycle states of a loan. Transitions are monotonic; terminal states
/// are permanent records.
#[odra::odra_type]
pub enum LoanStatus {
    /// Created, collateral locked, waiting for a lender
    Pending = 0,
    /// Funded; principal with the borrower, clock running
    Active = 1,
    /// Settled in full by the borrower
    Repaid = 2,
    /// Collateral seized by the lender after maturity
    Liquidated = 3,
}

/// A single peer-to-peer loan record
#[odra::odra_type]
pub struct Loan {
    /// Monotonically increasing identifier, starting at 1
    pub id: u64,
    /// Borrower that created the request
    pub borrower: Address,
    /// Lender, set exactly once at funding
    pub lender: Option<Address>,
    /// Principal amount
    pub principal: U256,
    /// Kind of the principal asset
    pub loan_asset_class: AssetClass,
    /// Token contract for token principals
    pub loan_asset_contract: Option<Address>,
    /// Kind of the collateral asset
    pub collateral_class: AssetClass,
    /// Token or collection contract for non-native collateral
    pub collateral_contract: Option<Address>,
    /// Item id for collectible collateral
    pub collateral_item_id: Option<u64>,
    /// Collateral value; for collectibles the floor price at creation
    pub collateral_amount: U256,
    /// Effective interest rate in basis points
    pub interest_rate_bps: u64,
    /// Loan duration in milliseconds
    pub duration: u64,
    /// Timestamp of creation
    pub created_at: u64,
    /// Timestamp of funding, set once
    pub funded_at: Option<u64>,
    /// Timestamp of repayment, set once
    pub repaid_at: Option<u64>,
    /// Current lifecycle state
    pub status: LoanStatus,
    /// Borrower risk tier snapshotted at creation
    pub risk_tier: u8,
    /// Dynamic rate computed at creation, kept for audit even when an
    /// explicit rate was chosen
    pub dynamic_rate_bps: u64,
}

impl Loan {
    /// Principal asset as a typed value
    pub fn loan_asset(&self) -> LoanAsset {
        match (&self.loan_asset_class, self.loan_asset_contract) {
            (AssetClass::Token, Some(contract)) => LoanAsset::Token(contract),
            _ => LoanAsset::Native,
        }
    }

    /// Collateral as a typed value
    pub fn collateral(&self) -> Collateral {
        match (
            &self.collateral_class,
            self.collateral_contract,
            self.collateral_item_id,
        ) {
            (AssetClass::Token, Some(contract), _) => Collateral::Token {
                contract,
                amount: self.collateral_amount,
            },
            (AssetClass::Collectible, Some(collection), Some(item_id)) => {
                Collateral::Collectible {
                    collection,
                    item_id,
                }
            }
            _ => Collateral::Native {
                amount: self.collateral_amount,
            },
        }
    }
}

/// Platform-wide configuration and counters, returned by a single view
#[odra::odra_type]
pub struct PlatformStats {
    /// Total loans ever created
    pub total_loans: u64,
    /// Platform fee in basis points
    pub platform_fee_bps: u64,
    /// Minimum collateral ratio in basis points
    pub min_collateral_ratio_bps: u64,
    /// Maximum accepted loan duration in milliseconds
    pub max_loan_duration: u64,
    /// Dynamic rate base component
    pub base_rate_bps: u64,
    /// Lower dynamic rate clamp
    pub min_dynamic_rate_bps: u64,
    /// Upper dynamic rate clamp
    pub max_dynamic_rate_bps: u64,
    /// Whether the platform is paused
    pub paused: bool,
}

/// Loan Registry contract
#[odra::module]
pub struct LoanRegistry {
    /// Platform owner, receives fees and holds admin rights
    owner: Var<Address>,

    /// Pause flag gating all lifecycle operations
    paused: Var<bool>,

    /// Platform fee in basis points, taken from each repayment
    platform_fee_bps: Var<u64>,

    /// Minimum collateral ratio in basis points
    min_collateral_ratio_bps: Var<u64>,

    /// Maximum accepted loan duration in milliseconds
    max_loan_duration: Var<u64>,

    /// Last assigned loan id; ids start at 1
    loan_counter: Var<u64>,

    /// Loan records by id
    loans: Mapping<u64, Loan>,

    /// Loan ids created by each borrower
    borrower_loans: Mapping<Address, Vec<u64>>,

    /// Loan ids funded by each lender
    lender_loans: Mapping<Address, Vec<u64>>,

    /// Whitelist of lendable and collateralizable assets
    assets: SubModule<AssetRegistry>,

    /// Per-asset supply/demand totals
    utilization: SubModule<UtilizationTracker>,

    /// Dynamic rate engine
    rates: SubModule<InterestRateEngine>,

    /// Per-user lending history
    user_stats: SubModule<UserStatsStore>,
}

#[odra::module]
impl LoanRegistry {
    /// Initialize the registry. The deployer becomes the platform owner.
    ///
    /// # Arguments
    /// * `platform_fee_bps` - Fee taken from each repayment, at most 1000
    pub fn init(&mut self, platform_fee_bps: u64) {
        if platform_fee_bps > MAX_PLATFORM_FEE_BPS {
            self.env().revert(LendingError::InvalidAmount);
        }

        let caller = self.env().caller();
        self.owner.set(caller);
        self.paused.set(false);
        self.platform_fee_bps.set(platform_fee_bps);
        self.min_collateral_ratio_bps.set(DEFAULT_MIN_COLLATERAL_RATIO_BPS);
        self.max_loan_duration.set(DEFAULT_MAX_LOAN_DURATION);
        self.loan_counter.set(0);
        self.rates.init();
    }

    // ========================================
    // Loan Creation
    // ========================================

    /// Request a native-asset loan. The attached CSPR is locked as
    /// collateral for the life of the loan.
    ///
    /// # Arguments
    /// * `principal` - Requested amount in motes
    /// * `interest_rate_bps` - Explicit rate; 0 selects the dynamic rate
    /// * `max_rate_bps` - Highest dynamic rate the borrower accepts
    /// * `duration` - Loan duration in milliseconds
    ///
    /// # Returns
    /// The new loan id
    #[odra(payable)]
    pub fn create_loan(
        &mut self,
        principal: U256,
        interest_rate_bps: u64,
        max_rate_bps: u64,
        duration: u64,
    ) -> u64 {
        let attached = Motes::to_u256(self.env().attached_value());
        self.create_loan_internal(
            LoanAsset::Native,
            Collateral::Native { amount: attached },
            principal,
            interest_rate_bps,
            max_rate_bps,
            duration,
        )
    }

    /// Request a native-asset loan backed by CEP-18 token collateral.
    /// The token position is recorded against its listing; moving the
    /// tokens themselves is left to the token contract.
    pub fn create_loan_with_token_collateral(
        &mut self,
        principal: U256,
        interest_rate_bps: u64,
        max_rate_bps: u64,
        duration: u64,
        collateral_token: Address,
        collateral_amount: U256,
    ) -> u64 {
        // TODO: CEP-18 transfer_from(borrower, self, collateral_amount)
        // once token custody is wired up
        self.create_loan_internal(
            LoanAsset::Native,
            Collateral::Token {
                contract: collateral_token,
                amount: collateral_amount,
            },
            principal,
            interest_rate_bps,
            max_rate_bps,
            duration,
        )
    }

    /// Request a native-asset loan backed by a single collectible. The item
    /// is valued at its collection's listed floor price.
    pub fn create_loan_with_nft_collateral(
        &mut self,
        principal: U256,
        interest_rate_bps: u64,
        max_rate_bps: u64,
        duration: u64,
        collection: Address,
        item_id: u64,
    ) -> u64 {
        // TODO: CEP-78 transfer(borrower, self, item_id) once collectible
        // custody is wired up
        self.create_loan_internal(
            LoanAsset::Native,
            Collateral::Collectible {
                collection,
                item_id,
            },
            principal,
            interest_rate_bps,
            max_rate_bps,
            duration,
        )
    }

    /// Request a CEP-18 token loan. The attached CSPR is locked as
    /// collateral; the principal moves through the token contract when the
    /// loan is funded.
    #[odra(payable)]
    pub fn create_token_loan(
        &mut self,
        token: Address,
        principal: U256,
        interest_rate_bps: u64,
        max_rate_bps: u64,
        duration: u64,
    ) -> u64 {
        let attached = Motes::to_u256(self.env().attached_value());
        self.create_loan_internal(
            LoanAsset::Token(token),
            Collateral::Native { amount: attached },
            principal,
            interest_rate_bps,
            max_rate_bps,
            duration,
        )
    }

    // ========================================
    // Funding
    // ========================================

    /// Fund a pending native-asset loan. The attached value must equal the
    /// principal exactly and is forwarded to the borrower in the same
    /// operation.
    #[odra(payable)]
    pub fn fund_loan(&mut self, loan_id: u64) {
        self.ensure_not_paused();

        let caller = self.env().caller();
        let mut loan = self.require_loan(loan_id);

        if loan.status != LoanStatus::Pending {
            self.env().revert(LendingError::AlreadyFunded);
        }
        if caller == loan.borrower {
            self.env().revert(LendingError::Unauthorized);
        }

        let asset = loan.loan_asset();
        if !asset.is_native() {
            self.env().revert(LendingError::UnsupportedAsset);
        }

        let attached = self.env().attached_value();
        if attached != Motes::to_u512(loan.principal) {
            self.env().revert(LendingError::InvalidAmount);
        }
        self.env().transfer_tokens(&loan.borrower, &attached);

        let now = self.env().get_block_time();
        loan.lender = Some(caller);
        loan.status = LoanStatus::Active;
        loan.funded_at = Some(now);
        let principal = loan.principal;
        let borrower = loan.borrower;
        self.loans.set(&loan_id, loan);

        self.push_lender_loan(&caller, loan_id);
        self.user_stats.record_funded(&caller, principal, true);
        self.utilization.on_loan_funded(&asset, principal);

        self.env().emit_event(LoanFunded {
            loan_id,
            lender: caller,
            borrower,
            principal,
            timestamp: now,
        });
    }

    /// Fund a pending token loan. The lender is recorded and the loan
    /// activates; the principal transfer itself runs through the token
    /// contract.
    pub fn fund_token_loan(&mut self, loan_id: u64) {
        self.ensure_not_paused();

        let caller = self.env().caller();
        let mut loan = self.require_loan(loan_id);

        if loan.status != LoanStatus::Pending {
            self.env().revert(LendingError::AlreadyFunded);
        }
        if caller == loan.borrower {
            self.env().revert(LendingError::Unauthorized);
        }

        let asset = loan.loan_asset();
        if asset.is_native() {
            self.env().revert(LendingError::UnsupportedAsset);
        }

        // TODO: CEP-18 transfer_from(lender, borrower, principal) once
        // token custody is wired up

        let now = self.env().get_block_time();
        loan.lender = Some(caller);
        loan.status = LoanStatus::Active;
        loan.funded_at = Some(now);
        let principal = loan.principal;
        let borrower = loan.borrower;
        self.loans.set(&loan_id, loan);

        self.push_lender_loan(&caller, loan_id);
        self.user_stats.record_funded(&caller, principal, false);
        self.utilization.on_loan_funded(&asset, principal);

        self.env().emit_event(LoanFunded {
            loan_id,
            lender: caller,
            borrower,
            principal,
            timestamp: now,
        });
    }

    // ========================================
    // Repayment
    // ========================================

    /// Repay an active loan in full. Interest accrues proportionally to the
    /// time elapsed since funding. For native loans the attached value must
    /// cover principal plus interest; the lender receives the total minus
    /// the platform fee, the fee goes to the owner, and any excess
    /// attachment is returned to the borrower along with the collateral.
    ///
    /// # Returns
    /// The total amount settled (principal + interest)
    #[odra(payable)]
    pub fn repay_loan(&mut self, loan_id: u64) -> U256 {
        self.ensure_not_paused();

        let caller = self.env().caller();
        let mut loan = self.require_loan(loan_id);
        self.ensure_active(&loan);
        if caller != loan.borrower {
            self.env().revert(LendingError::Unauthorized);
        }

        let funded_at = loan
            .funded_at
            .unwrap_or_revert_with(&self.env(), LendingError::LoanNotFunded);
        let now = self.env().get_block_time();
        let elapsed = now - funded_at;

        let interest = BpsMath::proportional_interest(
            loan.principal,
            loan.interest_rate_bps,
            elapsed,
            loan.duration,
        );
        let total = loan.principal + interest;
        let fee = BpsMath::fee_cut(total, self.platform_fee_bps.get_or_default());

        let lender = loan
            .lender
            .unwrap_or_revert_with(&self.env(), LendingError::LoanNotFunded);
        let attached = self.env().attached_value();

        match loan.loan_asset() {
            LoanAsset::Native => {
                let total_motes = Motes::to_u512(total);
                if attached < total_motes {
                    self.env().revert(LendingError::InvalidAmount);
                }
                self.env()
                    .transfer_tokens(&lender, &(total_motes - Motes::to_u512(fee)));
                if !fee.is_zero() {
                    let owner = self.owner.get_or_revert_with(LendingError::Unauthorized);
                    self.env().transfer_tokens(&owner, &Motes::to_u512(fee));
                }
                if attached > total_motes {
                    self.env().transfer_tokens(&caller, &(attached - total_motes));
                }
            }
            LoanAsset::Token(_) => {
                // TODO: CEP-18 transfer_from(borrower, lender, total - fee)
                // and transfer_from(borrower, owner, fee) once token custody
                // is wired up
                if !attached.is_zero() {
                    self.env().transfer_tokens(&caller, &attached);
                }
            }
        }

        self.release_collateral(&loan, &loan.borrower);

        let asset = loan.loan_asset();
        loan.status = LoanStatus::Repaid;
        loan.repaid_at = Some(now);
        let principal = loan.principal;
        let borrower = loan.borrower;
        self.loans.set(&loan_id, loan);

        self.user_stats.record_repaid(&borrower, principal);
        self.utilization.on_loan_closed(&asset, principal);

        self.env().emit_event(LoanRepaid {
            loan_id,
            borrower,
            total_paid: total,
            interest,
            fee,
            timestamp: now,
        });

        total
    }

    // ========================================
    // Liquidation
    // ========================================

    /// Seize the collateral of an overdue loan. Only the lender may
    /// liquidate, and only once the full duration has elapsed since
    /// funding. The collateral is the lender's sole recovery; no repayment
    /// occurs.
    pub fn liquidate_loan(&mut self, loan_id: u64) {
        self.ensure_not_paused();

        let caller = self.env().caller();
        let mut loan = self.require_loan(loan_id);
        self.ensure_active(&loan);

        let lender = loan
            .lender
            .unwrap_or_revert_with(&self.env(), LendingError::LoanNotFunded);
        if caller != lender {
            self.env().revert(LendingError::Unauthorized);
        }

        let funded_at = loan
            .funded_at
            .unwrap_or_revert_with(&self.env(), LendingError::LoanNotFunded);
        let now = self.env().get_block_time();
        if now < funded_at + loan.duration {
            self.env().revert(LendingError::LoanNotOverdue);
        }

        self.release_collateral(&loan, &lender);

        let asset = loan.loan_asset();
        loan.status = LoanStatus::Liquidated;
        let principal = loan.principal;
        let borrower = loan.borrower;
        let collateral_amount = loan.collateral_amount;
        self.loans.set(&loan_id, loan);

        self.user_stats.record_liquidated(&borrower);
        self.utilization.on_loan_closed(&asset, principal);

        self.env().emit_event(LoanLiquidated {
            loan_id,
            lender,
            borrower,
            collateral_amount,
            timestamp: now,
        });
    }

    // ========================================
    // View Functions
    // ========================================

    /// Get a loan record; reverts NotFound for ids never assigned
    pub fn get_loan(&self, loan_id: u64) -> Loan {
        self.require_loan(loan_id)
    }

    /// Total number of loans ever created
    pub fn get_loan_count(&self) -> u64 {
        self.loan_counter.get_or_default()
    }

    /// Lending history for a user, all-zero for users never seen
    pub fn get_user_stats(&self, user: Address) -> UserStats {
        self.user_stats.stats_of(user)
    }

    /// Supply/demand totals for an asset
    pub fn get_asset_utilization(
        &self,
        asset_class: AssetClass,
        asset_contract: Option<Address>,
    ) -> AssetUtilization {
        self.utilization.snapshot(asset_class, asset_contract)
    }

    /// Rate the engine would quote right now for the given borrower,
    /// asset, and collateral ratio
    pub fn get_dynamic_rate(
        &self,
        asset_class: AssetClass,
        asset_contract: Option<Address>,
        borrower: Address,
        collateral_ratio_bps: u64,
    ) -> u64 {
        let utilization = self
            .utilization
            .utilization_bps(asset_class.clone(), asset_contract);
        let stats = self.user_stats.stats_of(borrower);
        let tier = risk::score_borrower(&stats, asset_class, asset_contract);
        self.rates
            .dynamic_rate(utilization, tier, U256::from(collateral_ratio_bps))
    }

    /// Current dynamic rate parameters
    pub fn get_rate_params(&self) -> RateParams {
        self.rates.rate_params()
    }

    /// Platform configuration and counters in one view
    pub fn get_platform_stats(&self) -> PlatformStats {
        let params = self.rates.rate_params();
        PlatformStats {
            total_loans: self.loan_counter.get_or_default(),
            platform_fee_bps: self.platform_fee_bps.get_or_default(),
            min_collateral_ratio_bps: self.min_collateral_ratio_bps.get_or_default(),
            max_loan_duration: self.max_loan_duration.get_or_default(),
            base_rate_bps: params.base_rate_bps,
            min_dynamic_rate_bps: params.min_rate_bps,
            max_dynamic_rate_bps: params.max_rate_bps,
            paused: self.paused.get_or_default(),
        }
    }

    /// Whether a loan's duration has elapsed since funding. Never fails:
    /// unknown ids and unfunded loans report false, and terminal loans keep
    /// reporting from their funding time.
    pub fn is_loan_overdue(&self, loan_id: u64) -> bool {
        match self.loans.get(&loan_id) {
            Some(loan) => match loan.funded_at {
                Some(funded_at) => self.env().get_block_time() >= funded_at + loan.duration,
                None => false,
            },
            None => false,
        }
    }

    /// Loan ids created by a borrower, in creation order
    pub fn get_borrower_loans(&self, borrower: Address) -> Vec<u64> {
        self.borrower_loans.get(&borrower).unwrap_or_default()
    }

    /// Loan ids funded by a lender, in funding order
    pub fn get_lender_loans(&self, lender: Address) -> Vec<u64> {
        self.lender_loans.get(&lender).unwrap_or_default()
    }

    /// Token listing, if the contract was ever registered
    pub fn get_supported_token(&self, token_contract: Address) -> Option<SupportedToken> {
        self.assets.token_config(token_contract)
    }

    /// Collection listing, if the collection was ever registered
    pub fn get_supported_collection(&self, collection: Address) -> Option<SupportedCollection> {
        self.assets.collection_config(collection)
    }

    /// Platform owner
    pub fn get_owner(&self) -> Address {
        self.owner.get_or_revert_with(LendingError::Unauthorized)
    }

    /// Whether the platform is paused
    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    // ========================================
    // Admin Functions
    // ========================================

    /// Whitelist a fungible token for principals and collateral
    pub fn add_supported_token(&mut self, token_contract: Address, decimals: u8, risk_score: u8) {
        self.only_owner();
        self.assets.add_token(token_contract, decimals, risk_score);
    }

    /// Disable a token listing without deleting its history
    pub fn remove_supported_token(&mut self, token_contract: Address) {
        self.only_owner();
        self.assets.remove_token(token_contract);
    }

    /// Whitelist a collectible collection for collateral
    pub fn add_supported_collection(
        &mut self,
        collection: Address,
        floor_price: U256,
        risk_score: u8,
    ) {
        self.only_owner();
        self.assets.add_collection(collection, floor_price, risk_score);
    }

    /// Update a collection's floor price and enabled flag
    pub fn update_collection(&mut self, collection: Address, floor_price: U256, enabled: bool) {
        self.only_owner();
        self.assets.update_collection(collection, floor_price, enabled);
    }

    /// Update the platform fee, at most 1000 bps
    pub fn set_platform_fee(&mut self, new_fee_bps: u64) {
        self.only_owner();
        if new_fee_bps > MAX_PLATFORM_FEE_BPS {
            self.env().revert(LendingError::InvalidAmount);
        }
        let old_fee_bps = self.platform_fee_bps.get_or_default();
        self.platform_fee_bps.set(new_fee_bps);

        self.env().emit_event(PlatformFeeUpdated {
            old_fee_bps,
            new_fee_bps,
            updated_by: self.env().caller(),
        });
    }

    /// Update the minimum collateral ratio, at least 10000 bps
    pub fn set_min_collateral_ratio(&mut self, new_ratio_bps: u64) {
        self.only_owner();
        if new_ratio_bps < MIN_COLLATERAL_RATIO_FLOOR_BPS {
            self.env().revert(LendingError::InvalidAmount);
        }
        let old_ratio_bps = self.min_collateral_ratio_bps.get_or_default();
        self.min_collateral_ratio_bps.set(new_ratio_bps);

        self.env().emit_event(MinCollateralRatioUpdated {
            old_ratio_bps,
            new_ratio_bps,
            updated_by: self.env().caller(),
        });
    }

    /// Replace the dynamic rate parameters
    ///
    /// # Arguments
    /// * `base_rate_bps` - in [50, 1000]
    /// * `utilization_multiplier_bps` - at most 500
    /// * `risk_multiplier_bps` - at most 300
    /// * `max_rate_bps` - in [500, 5000], above min_rate_bps
    /// * `min_rate_bps` - in [50, 200]
    pub fn set_dynamic_rate_params(
        &mut self,
        base_rate_bps: u64,
        utilization_multiplier_bps: u64,
        risk_multiplier_bps: u64,
        max_rate_bps: u64,
        min_rate_bps: u64,
    ) {
        self.only_owner();
        self.rates.set_params(RateParams {
            base_rate_bps,
            utilization_multiplier_bps,
            risk_multiplier_bps,
            max_rate_bps,
            min_rate_bps,
        });

        self.env().emit_event(RateParamsUpdated {
            base_rate_bps,
            utilization_multiplier_bps,
            risk_multiplier_bps,
            max_rate_bps,
            min_rate_bps,
            updated_by: self.env().caller(),
        });
    }

    /// Pause all lifecycle operations
    pub fn pause(&mut self) {
        self.only_owner();
        self.paused.set(true);

        self.env().emit_event(ContractPaused {
            paused_by: self.env().caller(),
            timestamp: self.env().get_block_time(),
        });
    }

    /// Resume lifecycle operations
    pub fn unpause(&mut self) {
        self.only_owner();
        self.paused.set(false);

        self.env().emit_event(ContractUnpaused {
            unpaused_by: self.env().caller(),
            timestamp: self.env().get_block_time(),
        });
    }

    /// Hand platform ownership to another account
    pub fn transfer_ownership(&mut self, new_owner: Address) {
        self.only_owner();
        let old_owner = self.owner.get_or_revert_with(LendingError::Unauthorized);
        self.owner.set(new_owner);

        self.env().emit_event(OwnershipTransferred {
            old_owner,
            new_owner,
        });
    }
}

impl LoanRegistry {
    /// Shared creation path. Validation runs to completion before the loan
    /// record, indices, stats, or utilization are written.
    fn create_loan_internal(
        &mut self,
        asset: LoanAsset,
        collateral: Collateral,
        principal: U256,
        interest_rate_bps: u64,
        max_rate_bps: u64,
        duration: u64,
    ) -> u64 {
        self.ensure_not_paused();

        let caller = self.env().caller();

        if principal.is_zero() {
            self.env().revert(LendingError::InvalidAmount);
        }
        if duration == 0 || duration > self.max_loan_duration.get_or_default() {
            self.env().revert(LendingError::InvalidDuration);
        }

        self.assets.require_loan_asset_supported(&asset);
        let collateral_value = self.assets.collateral_value(&collateral);
        if collateral_value.is_zero() {
            self.env().revert(LendingError::InvalidAmount);
        }

        let ratio_bps = BpsMath::ratio_bps(collateral_value, principal)
            .unwrap_or_revert_with(&self.env(), LendingError::InvalidAmount);
        let min_ratio = U256::from(self.min_collateral_ratio_bps.get_or_default());
        if ratio_bps < min_ratio {
            self.env().revert(LendingError::InsufficientCollateral);
        }

        let stats = self.user_stats.stats_of(caller);
        let tier = risk::score_borrower(&stats, collateral.class(), collateral.contract());
        let utilization = self.utilization.utilization_for(&asset);
        let dynamic_rate_bps = self.rates.dynamic_rate(utilization, tier, ratio_bps);

        let effective_rate = if interest_rate_bps > 0 {
            self.rates.ensure_rate_in_bounds(interest_rate_bps);
            interest_rate_bps
        } else {
            if dynamic_rate_bps > max_rate_bps {
                self.env().revert(LendingError::RateRejected);
            }
            dynamic_rate_bps
        };

        let loan_id = self.loan_counter.get_or_default() + 1;
        self.loan_counter.set(loan_id);
        let now = self.env().get_block_time();

        let loan = Loan {
            id: loan_id,
            borrower: caller,
            lender: None,
            principal,
            loan_asset_class: asset.class(),
            loan_asset_contract: asset.contract(),
            collateral_class: collateral.class(),
            collateral_contract: collateral.contract(),
            collateral_item_id: collateral.item_id(),
            collateral_amount: collateral_value,
            interest_rate_bps: effective_rate,
            duration,
            created_at: now,
            funded_at: None,
            repaid_at: None,
            status: LoanStatus::Pending,
            risk_tier: tier.as_u8(),
            dynamic_rate_bps,
        };
        self.loans.set(&loan_id, loan);

        self.push_borrower_loan(&caller, loan_id);
        self.user_stats.record_created(&caller);
        self.utilization.on_loan_created(&asset, principal);

        self.env().emit_event(LoanCreated {
            loan_id,
            borrower: caller,
            principal,
            collateral_amount: collateral_value,
            interest_rate_bps: effective_rate,
            duration,
            risk_tier: tier.as_u8(),
            timestamp: now,
        });

        loan_id
    }

    /// Return a loan's collateral to the given recipient
    fn release_collateral(&mut self, loan: &Loan, recipient: &Address) {
        match loan.collateral() {
            Collateral::Native { amount } => {
                self.env().transfer_tokens(recipient, &Motes::to_u512(amount));
            }
            Collateral::Token { .. } => {
                // TODO: CEP-18 transfer(recipient, amount) once token
                // custody is wired up
            }
            Collateral::Collectible { .. } => {
                // TODO: CEP-78 transfer(recipient, item_id) once collectible
                // custody is wired up
            }
        }
    }

    fn require_loan(&self, loan_id: u64) -> Loan {
        self.loans
            .get(&loan_id)
            .unwrap_or_revert_with(&self.env(), LendingError::NotFound)
    }

    /// Active is the only state repayment and liquidation act on; Pending
    /// loans report the missing funding step instead
    fn ensure_active(&self, loan: &Loan) {
        if loan.status == LoanStatus::Active {
            return;
        }
        if loan.status == LoanStatus::Pending {
            self.env().revert(LendingError::LoanNotFunded);
        }
        self.env().revert(LendingError::LoanNotActive);
    }

    fn push_borrower_loan(&mut self, borrower: &Address, loan_id: u64) {
        let mut ids = self.borrower_loans.get(borrower).unwrap_or_default();
        ids.push(loan_id);
        self.borrower_loans.set(borrower, ids);
    }

    fn push_lender_loan(&mut self, lender: &Address, loan_id: u64) {
        let mut ids = self.lender_loans.get(lender).unwrap_or_default();
        ids.push(loan_id);
        self.lender_loans.set(lender, ids);
    }

    fn only_owner(&self) {
        let caller = self.env().caller();
        let owner = self.owner.get_or_revert_with(LendingError::Unauthorized);
        if caller != owner {
            self.env().revert(LendingError::Unauthorized);
        }
    }

    fn ensure_not_paused(&self) {
        if self.paused.get_or_default() {
            self.env().revert(LendingError::PlatformPaused);
        }
    }
}
