//! Reward Pool Contract
//!
//! Participants deposit BTC, the team periodically injects rewards, and
//! every injection is attributed to depositors in proportion to their
//! principal. Principal and accrued reward can be withdrawn at any time,
//! reward first.
//!
//! ## Execution Model
//!
//! Each public operation is atomic: it either completes or fails without
//! any observable effect. Deposit and reward injection check everything
//! before mutating the ledger. Withdrawal mutates the ledger, then sends
//! the asset; a failed send reverts the ledger changes. While the send is
//! in flight every state-mutating entry point rejects nested calls with
//! `Reentrancy`.
//!
//! Events are recorded only for operations that commit.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

// Charms SDK integration (conditional compilation)
#[cfg(feature = "charms")]
pub mod charms;
pub mod custody;


use reward_pool_common::{
    apply_withdrawal, distribute, revert_withdrawal,
    access_control::AccessGuard,
    errors::{PoolError, PoolResult},
    events::{EventLog, PoolEvent},
    ledger::{DepositOutcome, Ledger, PoolStats},
    types::{Address, Participant, PoolAction, PoolSnapshot, StateDigest},
    AssetTransfer, Distribution, Drawdown,
};

pub use custody::Custody;

// ============ Reward Pool Config ============

/// Configuration for the Reward Pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolConfig {
    /// Team address (only this can inject rewards)
    pub team: Address,
}

// ============ Call Context ============

/// Who is calling, and when
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Caller identity
    pub caller: Address,
    /// Current block height
    pub block_height: u64,
}

impl CallContext {
    /// Create a call context
    pub fn new(caller: Address, block_height: u64) -> Self {
        Self { caller, block_height }
    }
}

// ============ Reward Pool ============

/// The pool: immutable config, the ledger and the in-progress guard
#[derive(Debug, Clone)]
pub struct RewardPool {
    config: PoolConfig,
    guard: AccessGuard,
    ledger: Ledger,
    in_progress: bool,
    events: EventLog,
}

impl RewardPool {
    /// Create an empty pool
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        Self::restore(config, PoolSnapshot::new())
    }

    /// Create an empty pool whose team is the deployer
    pub fn deploy(deployer: Address) -> PoolResult<Self> {
        Self::new(PoolConfig { team: deployer })
    }

    /// Rebuild a pool from persisted state
    pub fn restore(config: PoolConfig, snapshot: PoolSnapshot) -> PoolResult<Self> {
        let guard = AccessGuard::new(config.team)?;
        let ledger = Ledger::from_snapshot(snapshot)?;

        Ok(Self {
            config,
            guard,
            ledger,
            in_progress: false,
            events: EventLog::new(),
        })
    }

    // ============ Operations ============

    /// Deposit `value` sats of principal for the caller
    ///
    /// The value is already in pool custody when this runs.
    pub fn deposit(&mut self, ctx: &CallContext, value: u64) -> PoolResult<DepositOutcome> {
        self.ensure_idle()?;

        let outcome = self.ledger.deposit(&ctx.caller, value, ctx.block_height)?;

        if outcome.newly_registered {
            self.events.emit(PoolEvent::ParticipantRegistered {
                participant: ctx.caller,
                registry_index: outcome.registry_index as u64,
                block_height: ctx.block_height,
            });
        }
        self.events.emit(PoolEvent::Deposited {
            depositor: ctx.caller,
            amount: value,
            new_principal: outcome.new_principal,
            total_principal: outcome.total_principal,
            block_height: ctx.block_height,
        });

        Ok(outcome)
    }

    /// Inject `value` sats of rewards (team only)
    pub fn reward_deposit(&mut self, ctx: &CallContext, value: u64) -> PoolResult<Distribution> {
        self.ensure_idle()?;
        self.guard.ensure_privileged(&ctx.caller)?;

        let distribution = distribute(&mut self.ledger, value, ctx.block_height)?;

        self.events.emit(PoolEvent::RewardsDistributed {
            team: ctx.caller,
            amount: distribution.amount,
            distributed: distribution.distributed,
            dust: distribution.dust,
            recipients: distribution.recipients,
            total_rewards: self.ledger.total_rewards(),
            block_height: ctx.block_height,
        });

        Ok(distribution)
    }

    /// Withdraw `amount` sats for the caller, reward first
    ///
    /// The ledger is updated before `transfer` runs. If the transfer fails
    /// the update is reverted and the transfer's error is returned.
    pub fn withdraw<T>(&mut self, ctx: &CallContext, amount: u64, transfer: &mut T) -> PoolResult<Drawdown>
    where
        T: AssetTransfer<Self> + ?Sized,
    {
        self.ensure_idle()?;
        self.in_progress = true;

        let drawdown = match apply_withdrawal(&mut self.ledger, &ctx.caller, amount, ctx.block_height) {
            Ok(drawdown) => drawdown,
            Err(err) => {
                self.in_progress = false;
                return Err(err);
            }
        };

        if drawdown.is_empty() {
            self.in_progress = false;
            return Ok(drawdown);
        }

        if let Err(err) = transfer.send(self, &ctx.caller, amount) {
            revert_withdrawal(&mut self.ledger, &drawdown);
            self.in_progress = false;
            return Err(err);
        }
        self.in_progress = false;

        self.events.emit(PoolEvent::Withdrawn {
            participant: ctx.caller,
            amount,
            reward_drawn: drawdown.reward_drawn,
            principal_drawn: drawdown.principal_drawn,
            block_height: ctx.block_height,
        });

        Ok(drawdown)
    }

    /// Run any action
    pub fn execute<T>(&mut self, ctx: &CallContext, action: &PoolAction, transfer: &mut T) -> PoolResult<()>
    where
        T: AssetTransfer<Self> + ?Sized,
    {
        match *action {
            PoolAction::Deposit { amount } => self.deposit(ctx, amount).map(|_| ()),
            PoolAction::RewardDeposit { amount } => self.reward_deposit(ctx, amount).map(|_| ()),
            PoolAction::Withdraw { amount } => self.withdraw(ctx, amount, transfer).map(|_| ()),
        }
    }

    fn ensure_idle(&self) -> PoolResult<()> {
        if self.in_progress {
            return Err(PoolError::Reentrancy);
        }
        Ok(())
    }

    // ============ Accessors ============

    /// Principal of `owner` (0 if never registered)
    pub fn get_deposit(&self, owner: &Address) -> u64 {
        self.ledger.principal_of(owner)
    }

    /// Reward of `owner` (0 if never registered)
    pub fn get_reward(&self, owner: &Address) -> u64 {
        self.ledger.reward_of(owner)
    }

    /// `(principal, reward)` of `owner`
    pub fn users(&self, owner: &Address) -> (u64, u64) {
        (self.get_deposit(owner), self.get_reward(owner))
    }

    /// Principal + reward of `owner`
    pub fn balance_of(&self, owner: &Address) -> u64 {
        self.ledger.balance_of(owner)
    }

    /// Full participant record, if registered
    pub fn participant(&self, owner: &Address) -> Option<&Participant> {
        self.ledger.participant(owner)
    }

    /// Returns true if `owner` has ever deposited
    pub fn is_registered(&self, owner: &Address) -> bool {
        self.ledger.is_registered(owner)
    }

    /// Registry in first-deposit order
    pub fn participants(&self) -> &[Participant] {
        self.ledger.participants()
    }

    /// Sum of all principals
    pub fn total_principal(&self) -> u64 {
        self.ledger.total_principal()
    }

    /// Nominal injected rewards still held (attributed + dust)
    pub fn total_rewards(&self) -> u64 {
        self.ledger.total_rewards()
    }

    /// Cumulative truncation loss
    pub fn dust(&self) -> u64 {
        self.ledger.dust()
    }

    /// Value the pool must hold in custody
    pub fn custodial_balance(&self) -> u64 {
        self.ledger.custodial_balance()
    }

    /// Pool statistics
    pub fn stats(&self) -> PoolStats {
        self.ledger.stats()
    }

    /// Team address
    pub fn team(&self) -> &Address {
        self.guard.team()
    }

    /// Pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Read-only ledger view
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Returns true while a withdrawal transfer is in flight
    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    /// Verify every ledger invariant
    pub fn check_invariants(&self) -> PoolResult<()> {
        self.ledger.check_invariants()
    }

    /// Persisted form of the pool state
    pub fn snapshot(&self) -> PoolSnapshot {
        self.ledger.to_snapshot()
    }

    /// SHA-256 commitment to the current state
    pub fn state_digest(&self) -> StateDigest {
        self.snapshot().digest()
    }

    /// Events of committed operations
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Take the recorded events, leaving the log empty
    pub fn take_events(&mut self) -> EventLog {
        core::mem::take(&mut self.events)
    }
}

// ============ State Transition Validation ============

/// Validate a proposed state transition
///
/// Re-executes `action` for `ctx` on `state` and accepts `new_state` only
/// if it commits to the same result.
///
/// # Returns
/// The events of the re-executed action
pub fn validate_transition<T>(
    config: &PoolConfig,
    state: &PoolSnapshot,
    new_state: &PoolSnapshot,
    ctx: &CallContext,
    action: &PoolAction,
    transfer: &mut T,
) -> PoolResult<EventLog>
where
    T: AssetTransfer<RewardPool> + ?Sized,
{
    let mut pool = RewardPool::restore(config.clone(), state.clone())?;
    pool.execute(ctx, action, transfer)?;

    if pool.state_digest() != new_state.digest() {
        return Err(PoolError::InvalidStateTransition);
    }

    Ok(pool.take_events())
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use reward_pool_common::events::EventType;

    const ONE_BTC: u64 = 100_000_000;

    fn team() -> Address {
        [9u8; 32]
    }

    fn alice() -> Address {
        [1u8; 32]
    }

    fn bob() -> Address {
        [2u8; 32]
    }

    fn create_test_pool() -> RewardPool {
        RewardPool::deploy(team()).unwrap()
    }

    fn funded_custody(amount: u64) -> Custody {
        let mut custody = Custody::new();
        custody.receive(amount).unwrap();
        custody
    }

    #[test]
    fn test_deploy_sets_team() {
        let pool = create_test_pool();
        assert_eq!(pool.team(), &team());
        assert_eq!(pool.config().team, team());
        assert_eq!(pool.total_principal(), 0);
        assert_eq!(pool.total_rewards(), 0);
    }

    #[test]
    fn test_deploy_zero_address_rejected() {
        assert!(matches!(
            RewardPool::deploy([0u8; 32]),
            Err(PoolError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_deposit_emits_events() {
        let mut pool = create_test_pool();

        pool.deposit(&CallContext::new(alice(), 100), ONE_BTC).unwrap();
        pool.deposit(&CallContext::new(alice(), 101), ONE_BTC).unwrap();

        assert_eq!(pool.get_deposit(&alice()), 2 * ONE_BTC);
        assert_eq!(pool.events().filter_by_type(EventType::ParticipantRegistered).len(), 1);
        assert_eq!(pool.events().filter_by_type(EventType::Deposited).len(), 2);
    }

    #[test]
    fn test_failed_operation_emits_nothing() {
        let mut pool = create_test_pool();

        assert_eq!(pool.deposit(&CallContext::new(alice(), 1), 0), Err(PoolError::ZeroValue));
        assert!(pool.reward_deposit(&CallContext::new(team(), 1), ONE_BTC).is_err());

        assert!(!pool.events().has_events());
    }

    #[test]
    fn test_reward_deposit_team_only() {
        let mut pool = create_test_pool();
        pool.deposit(&CallContext::new(alice(), 1), ONE_BTC).unwrap();

        let err = pool.reward_deposit(&CallContext::new(alice(), 2), ONE_BTC).unwrap_err();

        assert_eq!(err, PoolError::Unauthorized { expected: team(), actual: alice() });
        assert_eq!(pool.get_reward(&alice()), 0);
        assert_eq!(pool.total_rewards(), 0);
    }

    #[test]
    fn test_unauthorized_checked_before_value() {
        let mut pool = create_test_pool();
        let err = pool.reward_deposit(&CallContext::new(alice(), 1), 0).unwrap_err();
        assert!(matches!(err, PoolError::Unauthorized { .. }));
    }

    #[test]
    fn test_withdraw_sends_and_emits() {
        let mut pool = create_test_pool();
        let mut custody = funded_custody(3 * ONE_BTC);
        pool.deposit(&CallContext::new(alice(), 1), ONE_BTC).unwrap();
        pool.reward_deposit(&CallContext::new(team(), 2), 2 * ONE_BTC).unwrap();

        let drawdown = pool
            .withdraw(&CallContext::new(alice(), 3), 2 * ONE_BTC + 1, &mut custody)
            .unwrap();

        assert_eq!(drawdown.reward_drawn, 2 * ONE_BTC);
        assert_eq!(drawdown.principal_drawn, 1);
        assert_eq!(custody.payouts(), &[(alice(), 2 * ONE_BTC + 1)]);
        assert_eq!(custody.balance(), pool.custodial_balance());
        assert_eq!(pool.events().filter_by_type(EventType::Withdrawn).len(), 1);
        assert!(!pool.is_in_progress());
    }

    #[test]
    fn test_zero_withdraw_is_noop() {
        let mut pool = create_test_pool();
        let mut custody = funded_custody(ONE_BTC);
        pool.deposit(&CallContext::new(alice(), 1), ONE_BTC).unwrap();
        let digest = pool.state_digest();

        let drawdown = pool.withdraw(&CallContext::new(alice(), 2), 0, &mut custody).unwrap();

        assert!(drawdown.is_empty());
        assert!(custody.payouts().is_empty());
        assert_eq!(pool.state_digest(), digest);
        assert!(pool.events().filter_by_type(EventType::Withdrawn).is_empty());
    }

    #[test]
    fn test_execute_dispatch() {
        let mut pool = create_test_pool();
        let mut custody = funded_custody(5);

        pool.execute(&CallContext::new(alice(), 1), &PoolAction::Deposit { amount: 3 }, &mut custody).unwrap();
        pool.execute(&CallContext::new(team(), 2), &PoolAction::RewardDeposit { amount: 2 }, &mut custody).unwrap();
        pool.execute(&CallContext::new(alice(), 3), &PoolAction::Withdraw { amount: 4 }, &mut custody).unwrap();

        assert_eq!(pool.users(&alice()), (1, 0));
    }

    #[test]
    fn test_take_events_drains_log() {
        let mut pool = create_test_pool();
        pool.deposit(&CallContext::new(bob(), 1), ONE_BTC).unwrap();

        let taken = pool.take_events();

        assert_eq!(taken.len(), 2);
        assert!(!pool.events().has_events());
    }

    #[test]
    fn test_validate_transition_accepts_correct_state() {
        let config = PoolConfig { team: team() };
        let mut pool = RewardPool::new(config.clone()).unwrap();
        pool.deposit(&CallContext::new(alice(), 1), ONE_BTC).unwrap();
        let state = pool.snapshot();

        let ctx = CallContext::new(team(), 2);
        let action = PoolAction::RewardDeposit { amount: ONE_BTC / 2 };
        let mut expected = pool.clone();
        expected.reward_deposit(&ctx, ONE_BTC / 2).unwrap();

        let events = validate_transition(
            &config,
            &state,
            &expected.snapshot(),
            &ctx,
            &action,
            &mut Custody::new(),
        )
        .unwrap();

        assert_eq!(events.filter_by_type(EventType::RewardsDistributed).len(), 1);
    }

    #[test]
    fn test_validate_transition_rejects_inflated_reward() {
        let config = PoolConfig { team: team() };
        let mut pool = RewardPool::new(config.clone()).unwrap();
        pool.deposit(&CallContext::new(alice(), 1), ONE_BTC).unwrap();
        let state = pool.snapshot();

        let mut forged = state.clone();
        forged.participants[0].reward = ONE_BTC;
        forged.total_rewards = ONE_BTC;

        let result = validate_transition(
            &config,
            &state,
            &forged,
            &CallContext::new(team(), 2),
            &PoolAction::RewardDeposit { amount: ONE_BTC / 2 },
            &mut Custody::new(),
        );

        assert_eq!(result.unwrap_err(), PoolError::InvalidStateTransition);
    }

    #[test]
    fn test_validate_transition_propagates_action_error() {
        let config = PoolConfig { team: team() };
        let state = PoolSnapshot::new();

        let result = validate_transition(
            &config,
            &state,
            &state,
            &CallContext::new(team(), 1),
            &PoolAction::RewardDeposit { amount: ONE_BTC },
            &mut Custody::new(),
        );

        assert_eq!(result.unwrap_err(), PoolError::NoDeposits);
    }
}
