#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]
extern crate alloc;

// Shared modules
pub mod errors;
pub mod events;
pub mod math;

// Lending platform modules
pub mod asset_registry;
pub mod interest_rate;
pub mod loan_registry;
pub mod risk;
pub mod user_stats;
pub mod utilization;
