//! Charms SDK Integration for the Reward Pool
//!
//! Bridges Charms transactions to [`validate_transition`]. The pool lives in
//! a single state charm carrying its config and ledger snapshot:
//!
//! ```text
//! Initialize:
//!   IN:  -
//!   OUT: [Pool charm (empty ledger, team set)]
//!
//! Deposit / RewardDeposit:
//!   IN:  [Pool charm, BTC from caller]
//!   OUT: [Pool charm (updated)]
//!
//! Withdraw:
//!   IN:  [Pool charm]
//!   OUT: [Pool charm (updated), BTC to caller]
//! ```
//!
//! The transaction is valid only if re-executing the witnessed action on
//! the input state yields exactly the output state.
//!
//! ## Caller Identity
//!
//! A caller's address is the SHA-256 of a Bitcoin output script. The
//! witnessed caller must control one of the spent BTC inputs, and a
//! withdrawal is paid only by BTC outputs locked to the caller's script.

use charms_data::{App, Data, Transaction};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{validate_transition, CallContext, PoolConfig, RewardPool};
use reward_pool_common::{
    errors::{PoolError, PoolResult},
    types::{Address, PoolAction, PoolSnapshot},
    AssetTransfer,
};

// ============ Operation Codes ============

/// Operation codes for pool actions (encoded in witness)
pub mod op {
    /// Create the pool
    pub const INITIALIZE: u8 = 0x00;
    /// Deposit principal
    pub const DEPOSIT: u8 = 0x10;
    /// Inject rewards (team only)
    pub const REWARD_DEPOSIT: u8 = 0x11;
    /// Withdraw reward and principal
    pub const WITHDRAW: u8 = 0x12;
}

// ============ Charm and Witness Structures ============

/// Content of the pool state charm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolCharm {
    /// Immutable pool configuration
    pub config: PoolConfig,
    /// Ledger snapshot
    pub state: PoolSnapshot,
}

/// Witness data for pool operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolWitness {
    /// Operation type (see `op` module)
    pub op: u8,
    /// Identity the operation runs as
    pub caller: Address,
    /// Value for deposit, injection and withdrawal
    pub amount: Option<u64>,
}

impl PoolWitness {
    /// Witness for creating the pool with `team` as privileged identity
    pub fn initialize(team: Address) -> Self {
        Self { op: op::INITIALIZE, caller: team, amount: None }
    }

    /// Witness for a deposit
    pub fn deposit(caller: Address, amount: u64) -> Self {
        Self { op: op::DEPOSIT, caller, amount: Some(amount) }
    }

    /// Witness for a reward injection
    pub fn reward_deposit(team: Address, amount: u64) -> Self {
        Self { op: op::REWARD_DEPOSIT, caller: team, amount: Some(amount) }
    }

    /// Witness for a withdrawal
    pub fn withdraw(caller: Address, amount: u64) -> Self {
        Self { op: op::WITHDRAW, caller, amount: Some(amount) }
    }
}

// ============ Coin Budget ============

/// Pays a withdrawal out of the BTC outputs locked to its recipient
#[derive(Debug, Clone, Copy)]
pub struct CoinBudget {
    recipient: Address,
    available: u64,
}

impl CoinBudget {
    /// Budget of `available` sats payable to `recipient` only
    pub fn new(recipient: Address, available: u64) -> Self {
        Self { recipient, available }
    }

    /// Sats not yet paid out
    pub fn remaining(&self) -> u64 {
        self.available
    }
}

impl AssetTransfer<RewardPool> for CoinBudget {
    fn send(&mut self, _host: &mut RewardPool, to: &Address, amount: u64) -> PoolResult<()> {
        if *to != self.recipient {
            return Err(PoolError::TransferFailed { to: *to, amount });
        }
        self.available = self
            .available
            .checked_sub(amount)
            .ok_or(PoolError::TransferFailed { to: *to, amount })?;
        Ok(())
    }
}

// ============ Main Validation Function ============

/// Validates a reward pool operation within a Charms transaction.
///
/// # Arguments
/// * `app` - The RewardPool app definition
/// * `tx` - The transaction being validated
/// * `_x` - Public inputs (unused)
/// * `w` - Witness data (operation details)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn validate_pool_operation(app: &App, tx: &Transaction, _x: &Data, w: &Data) -> bool {
    let witness = match parse_witness(w) {
        Some(w) => w,
        None => return false,
    };

    if !extract_signers(tx).contains(&witness.caller) {
        return false;
    }

    let output = match extract_output_charm(app, tx) {
        Some(charm) => charm,
        None => return false,
    };

    if witness.op == op::INITIALIZE {
        return extract_input_charm(app, tx).is_none() && validate_initialize(&output, &witness);
    }

    let action = match witness_to_action(&witness) {
        Some(a) => a,
        None => return false,
    };

    let input = match extract_input_charm(app, tx) {
        Some(charm) => charm,
        None => return false,
    };

    // Config is fixed at creation
    if input.config != output.config {
        return false;
    }

    if !value_attached(&action, calculate_btc_inputs(tx)) {
        return false;
    }

    let ctx = CallContext::new(witness.caller, 0);
    let mut budget = CoinBudget::new(witness.caller, calculate_payout(tx, &witness.caller));

    validate_transition(&input.config, &input.state, &output.state, &ctx, &action, &mut budget).is_ok()
}

// ============ Parsing Functions ============

/// Parse witness data into PoolWitness
fn parse_witness(w: &Data) -> Option<PoolWitness> {
    w.value::<PoolWitness>().ok()
}

/// Convert witness to internal action type
fn witness_to_action(w: &PoolWitness) -> Option<PoolAction> {
    match w.op {
        op::DEPOSIT => Some(PoolAction::Deposit { amount: w.amount? }),
        op::REWARD_DEPOSIT => Some(PoolAction::RewardDeposit { amount: w.amount? }),
        op::WITHDRAW => Some(PoolAction::Withdraw { amount: w.amount? }),
        _ => None,
    }
}

/// A new pool must be empty and owned by the initializing caller
fn validate_initialize(output: &PoolCharm, witness: &PoolWitness) -> bool {
    if output.config.team != witness.caller {
        return false;
    }
    match RewardPool::new(output.config.clone()) {
        Ok(pool) => pool.snapshot() == output.state,
        Err(_) => false,
    }
}

/// Deposits and injections must be funded by the transaction
fn value_attached(action: &PoolAction, btc_inputs: u64) -> bool {
    match *action {
        PoolAction::Deposit { amount } | PoolAction::RewardDeposit { amount } => btc_inputs >= amount,
        PoolAction::Withdraw { .. } => true,
    }
}

// ============ State Extraction ============

fn extract_input_charm(app: &App, tx: &Transaction) -> Option<PoolCharm> {
    tx.ins.iter().find_map(|(_, charms)| {
        charms.get(app).and_then(|data| data.value::<PoolCharm>().ok())
    })
}

fn extract_output_charm(app: &App, tx: &Transaction) -> Option<PoolCharm> {
    tx.outs.iter().find_map(|charms| {
        charms.get(app).and_then(|data| data.value::<PoolCharm>().ok())
    })
}

/// Identity bound to a Bitcoin output script
pub fn script_identity(script: &[u8]) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(script);
    let result = hasher.finalize();
    let mut identity = [0u8; 32];
    identity.copy_from_slice(&result);
    identity
}

/// Identities controlling the spent BTC inputs
fn extract_signers(tx: &Transaction) -> Vec<Address> {
    tx.coin_ins
        .as_ref()
        .map(|ins| ins.iter().map(|o| script_identity(&o.dest)).collect())
        .unwrap_or_default()
}

// ============ Flow Calculations ============

/// BTC paid to `recipient` by the transaction outputs
fn calculate_payout(tx: &Transaction, recipient: &Address) -> u64 {
    tx.coin_outs
        .as_ref()
        .map(|outs| {
            outs.iter()
                .filter(|o| script_identity(&o.dest) == *recipient)
                .fold(0u64, |acc, o| acc.saturating_add(o.amount))
        })
        .unwrap_or(0)
}

/// Calculate total BTC spent by the transaction
fn calculate_btc_inputs(tx: &Transaction) -> u64 {
    tx.coin_ins
        .as_ref()
        .map(|ins| ins.iter().fold(0u64, |acc, o| acc.saturating_add(o.amount)))
        .unwrap_or(0)
}

// ============ Tests ============
