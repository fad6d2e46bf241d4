//! Custody Account
//!
//! Holds the native asset backing the pool and pays out withdrawals.
//! Deposits and reward injections arrive through [`Custody::receive`]
//! before the matching pool operation runs.

use reward_pool_common::{
    errors::{PoolError, PoolResult},
    types::Address,
    AssetTransfer, Vec,
};

/// Native asset held on behalf of the pool
#[derive(Debug, Clone, Default)]
pub struct Custody {
    balance: u64,
    payouts: Vec<(Address, u64)>,
    refusing: Vec<Address>,
}

impl Custody {
    /// Create an empty account
    pub fn new() -> Self {
        Self::default()
    }

    /// Current held balance
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Successful payouts, in order
    pub fn payouts(&self) -> &[(Address, u64)] {
        &self.payouts
    }

    /// Accept incoming value
    pub fn receive(&mut self, amount: u64) -> PoolResult<()> {
        self.balance = self.balance.checked_add(amount).ok_or(PoolError::Overflow)?;
        Ok(())
    }

    /// Make every payout to `recipient` fail
    pub fn refuse(&mut self, recipient: Address) {
        if !self.refusing.contains(&recipient) {
            self.refusing.push(recipient);
        }
    }

    /// Accept payouts to `recipient` again
    pub fn accept(&mut self, recipient: &Address) {
        self.refusing.retain(|r| r != recipient);
    }
}

impl<H: ?Sized> AssetTransfer<H> for Custody {
    fn send(&mut self, _host: &mut H, to: &Address, amount: u64) -> PoolResult<()> {
        if amount > self.balance || self.refusing.contains(to) {
            return Err(PoolError::TransferFailed { to: *to, amount });
        }

        self.balance -= amount;
        self.payouts.push((*to, amount));
        Ok(())
    }
}
