//! Reward Pool - Charms App Entry Point
//!
//! Validates pool state transitions on Bitcoin using client-side validation.
//!
//! ## What This App Validates
//!
//! - **Initialize**: Creates an empty pool owned by the team
//! - **Deposit**: Caller adds BTC principal
//! - **RewardDeposit**: Team adds BTC rewards, split by principal
//! - **Withdraw**: Caller takes BTC out, reward first

use charms_sdk::data::{App, Data, Transaction};

/// Main validation function for Reward Pool operations.
///
/// # Arguments
/// * `app` - The RewardPool app definition
/// * `tx` - The transaction being validated
/// * `x` - Public inputs
/// * `w` - Witness data (operation details)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn app_contract(app: &App, tx: &Transaction, x: &Data, w: &Data) -> bool {
    reward_pool::charms::validate_pool_operation(app, tx, x, w)
}

charms_sdk::main!(app_contract);
