//! Core Types for the Reward Pool
//!
//! Persistent data structures shared by the ledger, the contract crate and
//! the Charms adapter.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Type alias for addresses (32-byte hash)
pub type Address = [u8; 32];

/// Type alias for app identifiers
pub type AppId = [u8; 32];

/// Type alias for state commitments
pub type StateDigest = [u8; 32];

// ============ Participant ============

/// A registered depositor and its two balance components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Participant {
    /// Depositor's address
    pub owner: Address,
    /// Deposited and not yet withdrawn amount (sats)
    pub principal: u64,
    /// Rewards attributed and not yet withdrawn (sats)
    pub reward: u64,
    /// Block height of the first deposit
    pub registered_at: u64,
    /// Block height of the last balance change
    pub last_updated: u64,
}

impl Participant {
    /// Creates an empty participant record
    pub fn new(owner: Address, block_height: u64) -> Self {
        Self {
            owner,
            principal: 0,
            reward: 0,
            registered_at: block_height,
            last_updated: block_height,
        }
    }

    /// Principal + reward, or None if it does not fit in a u64
    pub fn balance(&self) -> Option<u64> {
        self.principal.checked_add(self.reward)
    }

    /// Returns true if nothing is left to withdraw
    pub fn is_drained(&self) -> bool {
        self.principal == 0 && self.reward == 0
    }
}

// ============ Actions ============

/// Public state-mutating operations of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolAction {
    /// Deposit principal (value attached by the caller)
    Deposit { amount: u64 },
    /// Inject rewards (team only, value attached by the caller)
    RewardDeposit { amount: u64 },
    /// Withdraw reward first, then principal
    Withdraw { amount: u64 },
}

// ============ Snapshot ============

/// Persisted form of the ledger
///
/// Participants are stored in registration order. The identity index is
/// not persisted; it is rebuilt (and the invariants re-checked) when a
/// ledger is restored from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolSnapshot {
    /// Registry in first-deposit order
    pub participants: Vec<Participant>,
    /// Sum of all principals
    pub total_principal: u64,
    /// Nominal sum of injected rewards still held (attributed + dust)
    pub total_rewards: u64,
    /// Cumulative truncation loss, never attributed
    pub dust: u64,
    /// Number of successful reward injections
    pub injections: u64,
    /// Upper bound on dust: sum of (registry size - 1) over injections
    pub dust_ceiling: u64,
}

impl PoolSnapshot {
    /// Creates an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// SHA-256 commitment over the borsh encoding
    pub fn digest(&self) -> StateDigest {
        let mut hasher = Sha256::new();
        hasher.update(borsh::to_vec(self).unwrap_or_default());
        let result = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        digest
    }
}
