//! Asset Registry - Whitelist of lendable and collateralizable assets
//!
//! Handles:
//! - Fungible token listings (decimals, risk score)
//! - Collectible collection listings (floor price, risk score)
//! - Asset guards used by the loan lifecycle

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::LendingError;
use crate::events::{CollectionAdded, CollectionUpdated, TokenAdded, TokenRemoved};

/// Maximum decimal precision accepted for a listed token
pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Asset risk scores are graded 1 (safest) to 10 (riskiest)
pub const MIN_ASSET_RISK_SCORE: u8 = 1;

/// Upper bound of the asset risk grade
pub const MAX_ASSET_RISK_SCORE: u8 = 10;

/// Storage tag for the three asset kinds the ledger understands
#[odra::odra_type]
pub enum AssetClass {
    /// Native CSPR
    Native = 0,
    /// CEP-18 fungible token
    Token = 1,
    /// CEP-78 collectible
    Collectible = 2,
}

/// Asset a loan's principal is denominated in
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoanAsset {
    /// Native CSPR
    Native,
    /// CEP-18 token identified by its contract
    Token(Address),
}

impl LoanAsset {
    pub fn class(&self) -> AssetClass {
        match self {
            LoanAsset::Native => AssetClass::Native,
            LoanAsset::Token(_) => AssetClass::Token,
        }
    }

    pub fn contract(&self) -> Option<Address> {
        match self {
            LoanAsset::Native => None,
            LoanAsset::Token(contract) => Some(*contract),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, LoanAsset::Native)
    }
}

/// Collateral backing a loan
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Collateral {
    /// Native CSPR held in contract custody
    Native { amount: U256 },
    /// CEP-18 token position
    Token { contract: Address, amount: U256 },
    /// Single CEP-78 item from a listed collection
    Collectible { collection: Address, item_id: u64 },
}

impl Collateral {
    pub fn class(&self) -> AssetClass {
        match self {
            Collateral::Native { .. } => AssetClass::Native,
            Collateral::Token { .. } => AssetClass::Token,
            Collateral::Collectible { .. } => AssetClass::Collectible,
        }
    }

    pub fn contract(&self) -> Option<Address> {
        match self {
            Collateral::Native { .. } => None,
            Collateral::Token { contract, .. } => Some(*contract),
            Collateral::Collectible { collection, .. } => Some(*collection),
        }
    }

    pub fn item_id(&self) -> Option<u64> {
        match self {
            Collateral::Collectible { item_id, .. } => Some(*item_id),
            _ => None,
        }
    }
}

/// Listing entry for a fungible token
#[odra::odra_type]
pub struct SupportedToken {
    /// Whether the token is currently accepted
    pub enabled: bool,
    /// Token decimal precision
    pub decimals: u8,
    /// Risk grade assigned at listing
    pub risk_score: u8,
}

/// Listing entry for a collectible collection
#[odra::odra_type]
pub struct SupportedCollection {
    /// Whether the collection is currently accepted
    pub enabled: bool,
    /// Floor price used to value items as collateral
    pub floor_price: U256,
    /// Risk grade assigned at listing
    pub risk_score: u8,
}

/// Asset Registry module
#[odra::module]
pub struct AssetRegistry {
    /// Token listings by contract address
    tokens: Mapping<Address, SupportedToken>,

    /// Collection listings by contract address
    collections: Mapping<Address, SupportedCollection>,
}

#[odra::module]
impl AssetRegistry {
    /// Whitelist a fungible token
    ///
    /// # Arguments
    /// * `token_contract` - Token contract address
    /// * `decimals` - Token decimal precision, in (0, 18]
    /// * `risk_score` - Risk grade, in [1, 10]
    pub fn add_token(&mut self, token_contract: Address, decimals: u8, risk_score: u8) {
        if !token_contract.is_contract() {
            self.env().revert(LendingError::InvalidTokenContract);
        }
        if decimals == 0 || decimals > MAX_TOKEN_DECIMALS {
            self.env().revert(LendingError::InvalidAmount);
        }
        self.ensure_risk_score(risk_score);

        self.tokens.set(
            &token_contract,
            SupportedToken {
                enabled: true,
                decimals,
                risk_score,
            },
        );

        self.env().emit_event(TokenAdded {
            contract: token_contract,
            decimals,
            risk_score,
            added_by: self.env().caller(),
        });
    }

    /// Disable a token listing. The entry is kept so loan history stays
    /// resolvable.
    pub fn remove_token(&mut self, token_contract: Address) {
        let mut config = self
            .tokens
            .get(&token_contract)
            .unwrap_or_revert_with(&self.env(), LendingError::NotFound);
        config.enabled = false;
        self.tokens.set(&token_contract, config);

        self.env().emit_event(TokenRemoved {
            contract: token_contract,
            removed_by: self.env().caller(),
        });
    }

    /// Whitelist a collectible collection
    ///
    /// # Arguments
    /// * `collection` - Collection contract address
    /// * `floor_price` - Positive floor price for collateral valuation
    /// * `risk_score` - Risk grade, in [1, 10]
    pub fn add_collection(&mut self, collection: Address, floor_price: U256, risk_score: u8) {
        if !collection.is_contract() {
            self.env().revert(LendingError::InvalidTokenContract);
        }
        if floor_price.is_zero() {
            self.env().revert(LendingError::InvalidAmount);
        }
        self.ensure_risk_score(risk_score);

        self.collections.set(
            &collection,
            SupportedCollection {
                enabled: true,
                floor_price,
                risk_score,
            },
        );

        self.env().emit_event(CollectionAdded {
            collection,
            floor_price,
            risk_score,
            added_by: self.env().caller(),
        });
    }

    /// Update a collection's floor price and enabled flag
    pub fn update_collection(&mut self, collection: Address, floor_price: U256, enabled: bool) {
        let mut config = self
            .collections
            .get(&collection)
            .unwrap_or_revert_with(&self.env(), LendingError::NotFound);
        if floor_price.is_zero() {
            self.env().revert(LendingError::InvalidAmount);
        }
        config.floor_price = floor_price;
        config.enabled = enabled;
        self.collections.set(&collection, config);

        self.env().emit_event(CollectionUpdated {
            collection,
            floor_price,
            enabled,
            updated_by: self.env().caller(),
        });
    }

    /// Get a token listing
    pub fn token_config(&self, token_contract: Address) -> Option<SupportedToken> {
        self.tokens.get(&token_contract)
    }

    /// Get a collection listing
    pub fn collection_config(&self, collection: Address) -> Option<SupportedCollection> {
        self.collections.get(&collection)
    }
}

impl AssetRegistry {
    /// Guard a loan asset: token principals must reference an enabled listing
    pub fn require_loan_asset_supported(&self, asset: &LoanAsset) {
        if let LoanAsset::Token(contract) = asset {
            self.require_token_enabled(contract);
        }
    }

    /// Look up a token listing, reverting NotFound for unregistered
    /// contracts and UnsupportedAsset for disabled ones
    pub fn require_token_enabled(&self, contract: &Address) -> SupportedToken {
        let config = self
            .tokens
            .get(contract)
            .unwrap_or_revert_with(&self.env(), LendingError::NotFound);
        if !config.enabled {
            self.env().revert(LendingError::UnsupportedAsset);
        }
        config
    }

    /// Look up a collection listing with the same guard split as tokens
    pub fn require_collection_enabled(&self, collection: &Address) -> SupportedCollection {
        let config = self
            .collections
            .get(collection)
            .unwrap_or_revert_with(&self.env(), LendingError::NotFound);
        if !config.enabled {
            self.env().revert(LendingError::UnsupportedAsset);
        }
        config
    }

    /// Value a collateral position for ratio checks. Token amounts are
    /// compared raw; collectibles are valued at the collection floor price
    /// recorded in the registry.
    pub fn collateral_value(&self, collateral: &Collateral) -> U256 {
        match collateral {
            Collateral::Native { amount } => *amount,
            Collateral::Token { contract, amount } => {
                self.require_token_enabled(contract);
                *amount
            }
            Collateral::Collectible { collection, .. } => {
                self.require_collection_enabled(collection).floor_price
            }
        }
    }

    fn ensure_risk_score(&self, risk_score: u8) {
        if !(MIN_ASSET_RISK_SCORE..=MAX_ASSET_RISK_SCORE).contains(&risk_score) {
            self.env().revert(LendingError::InvalidRiskScore);
        }
    }
}
