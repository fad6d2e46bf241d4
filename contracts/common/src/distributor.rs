//! Distributor
//!
//! Splits an injected reward across the registry in proportion to each
//! participant's principal at injection time:
//!
//! ```text
//! share_i = floor(amount * principal_i / total_principal)
//! reward_i += share_i
//! total_rewards += amount            (nominal)
//! dust += amount - Σ share_i         (never redistributed)
//! ```
//!
//! The plan is computed in full before any balance changes, so an
//! overflow anywhere in the registry rejects the injection as a whole.
//! Cost is linear in registry size, drained participants included.

use crate::Vec;
use crate::errors::{PoolError, PoolResult};
use crate::ledger::Ledger;
use crate::math::{self, max_distribution_dust, proportional_share};
use crate::validation::require_value;

/// A computed reward split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    /// Nominal injected amount
    pub amount: u64,
    /// Sum of all shares actually attributed
    pub distributed: u64,
    /// Truncation loss of this injection
    pub dust: u64,
    /// Participants with non-zero principal at injection time
    pub recipients: u64,
    /// Upper bound on `dust` for this injection
    pub dust_bound: u64,
    /// One share per registry entry, in registry order
    shares: Vec<u64>,
}

impl Distribution {
    /// Shares in registry order
    pub fn shares(&self) -> &[u64] {
        &self.shares
    }
}

/// Compute the reward split without touching the ledger
pub fn plan_distribution(ledger: &Ledger, amount: u64) -> PoolResult<Distribution> {
    require_value(amount)?;

    let total_principal = ledger.total_principal();
    if total_principal == 0 {
        return Err(PoolError::NoDeposits);
    }
    ledger.ensure_capacity(amount)?;

    let mut shares = Vec::with_capacity(ledger.registry_len());
    let mut distributed: u64 = 0;
    let mut recipients: u64 = 0;

    for participant in ledger.participants() {
        let share = proportional_share(amount, participant.principal, total_principal)?;
        participant.reward.checked_add(share).ok_or(PoolError::Overflow)?;

        if participant.principal > 0 {
            recipients += 1;
        }
        distributed = math::add(distributed, share)?;
        shares.push(share);
    }

    let dust = math::sub(amount, distributed)?;
    let dust_bound = max_distribution_dust(recipients as usize);
    if dust > dust_bound {
        return Err(PoolError::InvariantViolated { reason: "dust above ceiling" });
    }

    Ok(Distribution {
        amount,
        distributed,
        dust,
        recipients,
        dust_bound,
        shares,
    })
}

/// Inject `amount` as rewards across the registry
///
/// Fails with `ZeroValue` for an empty injection and `NoDeposits` while
/// nobody holds principal; the ledger is unchanged on any failure.
pub fn distribute(ledger: &mut Ledger, amount: u64, block_height: u64) -> PoolResult<Distribution> {
    let plan = plan_distribution(ledger, amount)?;

    for (participant, &share) in ledger.participants_mut().iter_mut().zip(plan.shares.iter()) {
        if share > 0 {
            participant.reward += share;
            participant.last_updated = block_height;
        }
    }
    ledger.record_distribution(plan.amount, plan.dust, plan.dust_bound);

    Ok(plan)
}
