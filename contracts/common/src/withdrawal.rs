//! Withdrawal Executor
//!
//! Withdrawals follow checks-effects-interactions:
//!
//! 1. **Check**: `amount <= principal + reward`
//! 2. **Effect**: draw reward first, then principal, from the participant
//!    and the pool totals
//! 3. **Interaction**: send the asset through an [`AssetTransfer`]
//!
//! If the interaction fails the effects are reverted with
//! [`revert_withdrawal`], restoring the ledger exactly.

use crate::errors::{PoolError, PoolResult};
use crate::ledger::Ledger;
use crate::math::split_withdrawal;
use crate::types::Address;

/// Outgoing transfer of the native asset
///
/// `host` is the object performing the withdrawal. It is handed to the
/// transfer so that a recipient can attempt to call back into it; the host
/// is responsible for rejecting such nested calls.
pub trait AssetTransfer<H: ?Sized> {
    /// Send `amount` to `to`
    fn send(&mut self, host: &mut H, to: &Address, amount: u64) -> PoolResult<()>;
}

/// Balance changes made by one withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawdown {
    /// Withdrawing participant
    pub owner: Address,
    /// Requested amount
    pub amount: u64,
    /// Part taken from reward
    pub reward_drawn: u64,
    /// Part taken from principal
    pub principal_drawn: u64,
    position: Option<usize>,
    previous_update: u64,
}

impl Drawdown {
    /// Returns true if the withdrawal moves no value
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }
}

/// Check a withdrawal against the ledger without changing it
pub fn prepare_withdrawal(ledger: &Ledger, owner: &Address, amount: u64) -> PoolResult<Drawdown> {
    let available = ledger.balance_of(owner);
    if amount > available {
        return Err(PoolError::InsufficientBalance {
            available,
            requested: amount,
        });
    }

    let (reward_drawn, principal_drawn) = split_withdrawal(amount, ledger.reward_of(owner));

    Ok(Drawdown {
        owner: *owner,
        amount,
        reward_drawn,
        principal_drawn,
        position: ledger.position_of(owner),
        previous_update: ledger.participant(owner).map(|p| p.last_updated).unwrap_or(0),
    })
}

/// Check and apply a withdrawal's ledger effects
///
/// Must run before the asset transfer. A zero-amount withdrawal passes
/// the check and changes nothing.
pub fn apply_withdrawal(
    ledger: &mut Ledger,
    owner: &Address,
    amount: u64,
    block_height: u64,
) -> PoolResult<Drawdown> {
    let drawdown = prepare_withdrawal(ledger, owner, amount)?;

    if let Some(position) = drawdown.position {
        if !drawdown.is_empty() {
            ledger.debit(position, drawdown.reward_drawn, drawdown.principal_drawn, block_height);
        }
    }

    Ok(drawdown)
}

/// Undo the effects of [`apply_withdrawal`] after a failed transfer
///
/// Only valid if the ledger has not been mutated since.
pub fn revert_withdrawal(ledger: &mut Ledger, drawdown: &Drawdown) {
    if let Some(position) = drawdown.position {
        if !drawdown.is_empty() {
            ledger.credit_back(
                position,
                drawdown.reward_drawn,
                drawdown.principal_drawn,
                drawdown.previous_update,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributor::distribute;

    fn alice() -> Address {
        [1u8; 32]
    }

    fn funded_ledger() -> Ledger {
        // principal 10, reward 4
        let mut ledger = Ledger::new();
        ledger.deposit(&alice(), 10, 1).unwrap();
        distribute(&mut ledger, 4, 2).unwrap();
        ledger
    }

    #[test]
    fn test_reward_only_drawdown() {
        let mut ledger = funded_ledger();

        let drawdown = apply_withdrawal(&mut ledger, &alice(), 3, 5).unwrap();

        assert_eq!(drawdown.reward_drawn, 3);
        assert_eq!(drawdown.principal_drawn, 0);
        assert_eq!(ledger.reward_of(&alice()), 1);
        assert_eq!(ledger.principal_of(&alice()), 10);
        assert_eq!(ledger.total_rewards(), 1);
        assert_eq!(ledger.total_principal(), 10);
    }

    #[test]
    fn test_reward_then_principal() {
        let mut ledger = funded_ledger();

        let drawdown = apply_withdrawal(&mut ledger, &alice(), 9, 5).unwrap();

        assert_eq!(drawdown.reward_drawn, 4);
        assert_eq!(drawdown.principal_drawn, 5);
        assert_eq!(ledger.reward_of(&alice()), 0);
        assert_eq!(ledger.principal_of(&alice()), 5);
        assert!(ledger.check_invariants().is_ok());
    }

    #[test]
    fn test_full_balance() {
        let mut ledger = funded_ledger();

        apply_withdrawal(&mut ledger, &alice(), 14, 5).unwrap();

        assert_eq!(ledger.balance_of(&alice()), 0);
        assert!(ledger.is_registered(&alice()));
        assert_eq!(ledger.custodial_balance(), 0);
    }

    #[test]
    fn test_exceeding_balance_rejected() {
        let mut ledger = funded_ledger();
        let before = ledger.to_snapshot();

        let result = apply_withdrawal(&mut ledger, &alice(), 15, 5);

        assert_eq!(
            result,
            Err(PoolError::InsufficientBalance { available: 14, requested: 15 })
        );
        assert_eq!(ledger.to_snapshot(), before);
    }

    #[test]
    fn test_unregistered_caller() {
        let mut ledger = funded_ledger();
        let stranger = [7u8; 32];

        assert!(matches!(
            apply_withdrawal(&mut ledger, &stranger, 1, 5),
            Err(PoolError::InsufficientBalance { available: 0, .. })
        ));

        let empty = apply_withdrawal(&mut ledger, &stranger, 0, 5).unwrap();
        assert!(empty.is_empty());
        assert!(!ledger.is_registered(&stranger));
    }

    #[test]
    fn test_revert_restores_exactly() {
        let mut ledger = funded_ledger();
        let before = ledger.to_snapshot();

        let drawdown = apply_withdrawal(&mut ledger, &alice(), 12, 9).unwrap();
        assert_ne!(ledger.to_snapshot(), before);

        revert_withdrawal(&mut ledger, &drawdown);
        assert_eq!(ledger.to_snapshot(), before);
    }
}
