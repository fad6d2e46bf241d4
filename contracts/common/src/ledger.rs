//! Ledger
//!
//! Owns the pool state: the participant registry, per-participant
//! principal and reward, and the running totals.
//!
//! ## Layout
//!
//! - **Arena**: participants live in an append-only `Vec` in first-deposit
//!   order. Entries are never removed, a drained participant stays
//!   registered.
//! - **Index**: `BTreeMap<Address, usize>` from identity to arena position
//!   for lookups.
//! - **Totals**: `total_rewards` is nominal. It includes the truncation
//!   dust of every distribution, which is tracked separately so that
//!   `total_rewards == Σ reward + dust` always holds.
//!
//! Mutations are only reachable through deposit, the distributor and the
//! withdrawal executor. Each of them checks everything before touching
//! state, so a failed call leaves the ledger unchanged.

use crate::{BTreeMap, Vec};
use crate::errors::{PoolError, PoolResult};
use crate::math;
use crate::types::{Address, Participant, PoolSnapshot};
use crate::validation::require_value;

/// Outcome of a deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOutcome {
    /// Position of the depositor in the registry
    pub registry_index: usize,
    /// True if this deposit registered the depositor
    pub newly_registered: bool,
    /// Depositor's principal after the deposit
    pub new_principal: u64,
    /// Pool principal after the deposit
    pub total_principal: u64,
}

/// Pool statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    /// Sum of all principals
    pub total_principal: u64,
    /// Nominal injected rewards still held
    pub total_rewards: u64,
    /// Rewards attributed to participants
    pub attributed_rewards: u64,
    /// Cumulative truncation loss
    pub dust: u64,
    /// Registered identities, including drained ones
    pub registry_size: u64,
    /// Participants with a non-zero balance
    pub active_participants: u64,
    /// Successful reward injections
    pub injections: u64,
    /// Value the pool must hold in custody
    pub custodial_balance: u64,
}

/// Pool ledger
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    participants: Vec<Participant>,
    index: BTreeMap<Address, usize>,
    total_principal: u64,
    total_rewards: u64,
    dust: u64,
    injections: u64,
    dust_ceiling: u64,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a ledger from its persisted form
    ///
    /// Rebuilds the identity index and fails if the snapshot contains a
    /// duplicate identity or totals that disagree with the balances.
    pub fn from_snapshot(snapshot: PoolSnapshot) -> PoolResult<Self> {
        let mut index = BTreeMap::new();
        for (position, participant) in snapshot.participants.iter().enumerate() {
            if index.insert(participant.owner, position).is_some() {
                return Err(PoolError::InvariantViolated {
                    reason: "duplicate identity in registry",
                });
            }
        }

        let ledger = Self {
            participants: snapshot.participants,
            index,
            total_principal: snapshot.total_principal,
            total_rewards: snapshot.total_rewards,
            dust: snapshot.dust,
            injections: snapshot.injections,
            dust_ceiling: snapshot.dust_ceiling,
        };
        ledger.check_invariants()?;
        Ok(ledger)
    }

    /// Persisted form of the ledger
    pub fn to_snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            participants: self.participants.clone(),
            total_principal: self.total_principal,
            total_rewards: self.total_rewards,
            dust: self.dust,
            injections: self.injections,
            dust_ceiling: self.dust_ceiling,
        }
    }

    // ============ Accessors ============

    /// Participant record, if registered
    pub fn participant(&self, owner: &Address) -> Option<&Participant> {
        self.index.get(owner).map(|&position| &self.participants[position])
    }

    /// Principal of `owner` (0 if never registered)
    pub fn principal_of(&self, owner: &Address) -> u64 {
        self.participant(owner).map(|p| p.principal).unwrap_or(0)
    }

    /// Reward of `owner` (0 if never registered)
    pub fn reward_of(&self, owner: &Address) -> u64 {
        self.participant(owner).map(|p| p.reward).unwrap_or(0)
    }

    /// Principal + reward of `owner`
    ///
    /// Cannot saturate in practice: the custodial balance is kept within
    /// u64, and every participant balance is part of it.
    pub fn balance_of(&self, owner: &Address) -> u64 {
        self.participant(owner)
            .map(|p| p.principal.saturating_add(p.reward))
            .unwrap_or(0)
    }

    /// Returns true if `owner` has ever deposited
    pub fn is_registered(&self, owner: &Address) -> bool {
        self.index.contains_key(owner)
    }

    /// Registry in first-deposit order
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Number of registered identities
    pub fn registry_len(&self) -> usize {
        self.participants.len()
    }

    /// Sum of all principals
    pub fn total_principal(&self) -> u64 {
        self.total_principal
    }

    /// Nominal injected rewards still held (attributed + dust)
    pub fn total_rewards(&self) -> u64 {
        self.total_rewards
    }

    /// Rewards attributed to participants (Σ reward)
    pub fn attributed_rewards(&self) -> u64 {
        self.total_rewards.saturating_sub(self.dust)
    }

    /// Cumulative truncation loss
    pub fn dust(&self) -> u64 {
        self.dust
    }

    /// Upper bound the dust must stay within
    pub fn dust_ceiling(&self) -> u64 {
        self.dust_ceiling
    }

    /// Number of successful reward injections
    pub fn injections(&self) -> u64 {
        self.injections
    }

    /// Value the pool must hold: deposits + injected rewards - withdrawals
    pub fn custodial_balance(&self) -> u64 {
        self.total_principal.saturating_add(self.total_rewards)
    }

    /// Pool statistics
    pub fn stats(&self) -> PoolStats {
        let active = self.participants.iter().filter(|p| !p.is_drained()).count();

        PoolStats {
            total_principal: self.total_principal,
            total_rewards: self.total_rewards,
            attributed_rewards: self.attributed_rewards(),
            dust: self.dust,
            registry_size: self.participants.len() as u64,
            active_participants: active as u64,
            injections: self.injections,
            custodial_balance: self.custodial_balance(),
        }
    }

    /// Verify every ledger invariant
    pub fn check_invariants(&self) -> PoolResult<()> {
        if self.index.len() != self.participants.len() {
            return Err(PoolError::InvariantViolated { reason: "index size mismatch" });
        }
        for (position, participant) in self.participants.iter().enumerate() {
            if self.index.get(&participant.owner) != Some(&position) {
                return Err(PoolError::InvariantViolated { reason: "index out of sync" });
            }
        }

        let (principal_sum, reward_sum) = self.participants.iter().fold(
            (0u128, 0u128),
            |(principal, reward), p| (principal + p.principal as u128, reward + p.reward as u128),
        );

        if principal_sum != self.total_principal as u128 {
            return Err(PoolError::InvariantViolated { reason: "total principal mismatch" });
        }
        if reward_sum + self.dust as u128 != self.total_rewards as u128 {
            return Err(PoolError::InvariantViolated { reason: "total rewards mismatch" });
        }
        if self.dust > self.dust_ceiling {
            return Err(PoolError::InvariantViolated { reason: "dust above ceiling" });
        }
        if self.total_principal.checked_add(self.total_rewards).is_none() {
            return Err(PoolError::InvariantViolated { reason: "custodial balance overflow" });
        }
        Ok(())
    }

    // ============ Mutations ============

    /// Credit a deposit of `amount` to `owner`
    ///
    /// Registers `owner` on first deposit. No other participant changes.
    pub fn deposit(&mut self, owner: &Address, amount: u64, block_height: u64) -> PoolResult<DepositOutcome> {
        require_value(amount)?;
        self.ensure_capacity(amount)?;

        let total_principal = math::add(self.total_principal, amount)?;
        let new_principal = math::add(self.principal_of(owner), amount)?;

        let (registry_index, newly_registered) = match self.index.get(owner) {
            Some(&position) => (position, false),
            None => {
                let position = self.participants.len();
                self.participants.push(Participant::new(*owner, block_height));
                self.index.insert(*owner, position);
                (position, true)
            }
        };

        let participant = &mut self.participants[registry_index];
        participant.principal = new_principal;
        participant.last_updated = block_height;
        self.total_principal = total_principal;

        Ok(DepositOutcome {
            registry_index,
            newly_registered,
            new_principal,
            total_principal,
        })
    }

    /// Fails with `Overflow` if custody could no longer be expressed in u64
    pub(crate) fn ensure_capacity(&self, incoming: u64) -> PoolResult<()> {
        self.custodial_balance_checked()?
            .checked_add(incoming)
            .ok_or(PoolError::Overflow)?;
        Ok(())
    }

    fn custodial_balance_checked(&self) -> PoolResult<u64> {
        math::add(self.total_principal, self.total_rewards)
    }

    pub(crate) fn position_of(&self, owner: &Address) -> Option<usize> {
        self.index.get(owner).copied()
    }

    pub(crate) fn participants_mut(&mut self) -> &mut [Participant] {
        &mut self.participants
    }

    pub(crate) fn record_distribution(&mut self, amount: u64, dust: u64, ceiling: u64) {
        self.total_rewards += amount;
        self.dust += dust;
        self.dust_ceiling += ceiling;
        self.injections += 1;
    }

    pub(crate) fn debit(&mut self, position: usize, reward: u64, principal: u64, block_height: u64) {
        let participant = &mut self.participants[position];
        participant.reward -= reward;
        participant.principal -= principal;
        participant.last_updated = block_height;
        self.total_rewards -= reward;
        self.total_principal -= principal;
    }

    pub(crate) fn credit_back(&mut self, position: usize, reward: u64, principal: u64, last_updated: u64) {
        let participant = &mut self.participants[position];
        participant.reward += reward;
        participant.principal += principal;
        participant.last_updated = last_updated;
        self.total_rewards += reward;
        self.total_principal += principal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_BTC: u64 = 100_000_000;

    fn alice() -> Address {
        [1u8; 32]
    }

    fn bob() -> Address {
        [2u8; 32]
    }

    #[test]
    fn test_new_ledger() {
        let ledger = Ledger::new();
        assert_eq!(ledger.total_principal(), 0);
        assert_eq!(ledger.total_rewards(), 0);
        assert_eq!(ledger.registry_len(), 0);
        assert_eq!(ledger.balance_of(&alice()), 0);
        assert!(ledger.check_invariants().is_ok());
    }

    #[test]
    fn test_first_deposit_registers() {
        let mut ledger = Ledger::new();

        let outcome = ledger.deposit(&alice(), ONE_BTC, 10).unwrap();

        assert!(outcome.newly_registered);
        assert_eq!(outcome.registry_index, 0);
        assert_eq!(outcome.new_principal, ONE_BTC);
        assert_eq!(ledger.principal_of(&alice()), ONE_BTC);
        assert_eq!(ledger.reward_of(&alice()), 0);
        assert_eq!(ledger.total_principal(), ONE_BTC);
        assert_eq!(ledger.participant(&alice()).unwrap().registered_at, 10);
    }

    #[test]
    fn test_repeat_deposit_keeps_single_entry() {
        let mut ledger = Ledger::new();
        ledger.deposit(&alice(), ONE_BTC, 10).unwrap();
        ledger.deposit(&bob(), 2 * ONE_BTC, 11).unwrap();

        let outcome = ledger.deposit(&alice(), ONE_BTC, 12).unwrap();

        assert!(!outcome.newly_registered);
        assert_eq!(outcome.registry_index, 0);
        assert_eq!(ledger.registry_len(), 2);
        assert_eq!(ledger.principal_of(&alice()), 2 * ONE_BTC);
        assert_eq!(ledger.principal_of(&bob()), 2 * ONE_BTC);
        assert_eq!(ledger.total_principal(), 4 * ONE_BTC);
        assert!(ledger.check_invariants().is_ok());
    }

    #[test]
    fn test_zero_deposit_rejected() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.deposit(&alice(), 0, 1), Err(PoolError::ZeroValue));
        assert!(!ledger.is_registered(&alice()));
    }

    #[test]
    fn test_deposit_overflow_leaves_state() {
        let mut ledger = Ledger::new();
        ledger.deposit(&alice(), u64::MAX - 10, 1).unwrap();

        let result = ledger.deposit(&bob(), 11, 2);

        assert_eq!(result, Err(PoolError::Overflow));
        assert!(!ledger.is_registered(&bob()));
        assert_eq!(ledger.total_principal(), u64::MAX - 10);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut ledger = Ledger::new();
        ledger.deposit(&alice(), ONE_BTC, 1).unwrap();
        ledger.deposit(&bob(), 3 * ONE_BTC, 2).unwrap();

        let restored = Ledger::from_snapshot(ledger.to_snapshot()).unwrap();

        assert_eq!(restored.principal_of(&bob()), 3 * ONE_BTC);
        assert_eq!(restored.participants()[1].owner, bob());
        assert_eq!(restored.to_snapshot(), ledger.to_snapshot());
    }

    #[test]
    fn test_snapshot_with_duplicate_rejected() {
        let mut snapshot = PoolSnapshot::new();
        let mut entry = Participant::new(alice(), 1);
        entry.principal = 5;
        snapshot.participants.push(entry.clone());
        snapshot.participants.push(entry);
        snapshot.total_principal = 10;

        assert!(matches!(
            Ledger::from_snapshot(snapshot),
            Err(PoolError::InvariantViolated { .. })
        ));
    }

    #[test]
    fn test_snapshot_with_wrong_totals_rejected() {
        let mut snapshot = PoolSnapshot::new();
        let mut entry = Participant::new(alice(), 1);
        entry.principal = 5;
        entry.reward = 2;
        snapshot.participants.push(entry);
        snapshot.total_principal = 5;
        snapshot.total_rewards = 3; // 2 attributed, 1 unaccounted

        assert_eq!(
            Ledger::from_snapshot(snapshot.clone()).unwrap_err(),
            PoolError::InvariantViolated { reason: "total rewards mismatch" }
        );

        // Same snapshot is valid once the missing unit is recorded as dust
        snapshot.dust = 1;
        snapshot.dust_ceiling = 1;
        assert!(Ledger::from_snapshot(snapshot).is_ok());
    }

    #[test]
    fn test_stats() {
        let mut ledger = Ledger::new();
        ledger.deposit(&alice(), ONE_BTC, 1).unwrap();
        ledger.deposit(&bob(), ONE_BTC, 1).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats.registry_size, 2);
        assert_eq!(stats.active_participants, 2);
        assert_eq!(stats.custodial_balance, 2 * ONE_BTC);
        assert_eq!(stats.injections, 0);
    }
}
