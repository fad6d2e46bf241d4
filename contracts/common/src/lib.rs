//! Reward Pool Common Library
//!
//! Shared types, constants, and the accounting core of the reward pool:
//! participants deposit the native asset, the team injects rewards, and
//! every injection is attributed to depositors in proportion to their
//! principal.
//!
//! ## Components
//!
//! - **Ledger**: participant registry, balances and running totals
//! - **AccessGuard**: the single privileged identity allowed to inject rewards
//! - **Distributor**: proportional, floor-rounded reward split
//! - **Withdrawal Executor**: reward-first draw-down with checks-effects-
//!   interactions ordering and exact rollback
//!
//! All amounts are unsigned integers in the asset's smallest unit. There
//! is no floating point anywhere in this crate.
//!
//! This crate is `no_std` compatible when built without the default `std`
//! feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export collections for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::{collections::BTreeMap, vec::Vec};
#[cfg(feature = "std")]
pub use std::{collections::BTreeMap, vec::Vec};

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod validation;
pub mod events;
pub mod access_control;
pub mod ledger;
pub mod distributor;
pub mod withdrawal;

// Re-exports for convenience
pub use errors::*;
pub use types::*;
pub use events::*;
pub use access_control::AccessGuard;
pub use ledger::{DepositOutcome, Ledger, PoolStats};
pub use distributor::{distribute, plan_distribution, Distribution};
pub use withdrawal::{apply_withdrawal, prepare_withdrawal, revert_withdrawal, AssetTransfer, Drawdown};
