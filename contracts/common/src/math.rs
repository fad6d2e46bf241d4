//! Mathematical Utilities for the Reward Pool
//!
//! Integer-only arithmetic. Products are widened to u128 and every step
//! is checked; division always floors.

use crate::errors::{PoolError, PoolResult};

/// Proportional share of `amount` for `weight` out of `total_weight`
///
/// share = floor(amount * weight / total_weight)
///
/// # Arguments
/// * `amount` - Value being split (sats)
/// * `weight` - Participant's principal
/// * `total_weight` - Total principal in the pool
///
/// # Returns
/// The floored share. Never exceeds `amount` while `weight <= total_weight`.
pub fn proportional_share(amount: u64, weight: u64, total_weight: u64) -> PoolResult<u64> {
    if total_weight == 0 {
        return Err(PoolError::DivisionByZero);
    }

    let share = (amount as u128)
        .checked_mul(weight as u128)
        .ok_or(PoolError::Overflow)?
        .checked_div(total_weight as u128)
        .ok_or(PoolError::DivisionByZero)?;

    u64::try_from(share).map_err(|_| PoolError::Overflow)
}

/// Split a withdrawal into its reward and principal parts
///
/// Reward is drawn first:
/// reward_drawn = min(amount, reward), principal_drawn = amount - reward_drawn
///
/// The caller must already have checked `amount <= principal + reward`.
pub fn split_withdrawal(amount: u64, reward: u64) -> (u64, u64) {
    let reward_drawn = amount.min(reward);
    (reward_drawn, amount - reward_drawn)
}

/// Maximum truncation loss of one distribution over `recipients` holders
///
/// Each non-zero holder loses strictly less than one unit, and the total
/// loss is an integer, so it is at most `recipients - 1`.
pub fn max_distribution_dust(recipients: usize) -> u64 {
    (recipients as u64).saturating_sub(1)
}

/// Checked addition mapped to the pool error type
pub fn add(a: u64, b: u64) -> PoolResult<u64> {
    a.checked_add(b).ok_or(PoolError::Overflow)
}

/// Checked subtraction mapped to the pool error type
pub fn sub(a: u64, b: u64) -> PoolResult<u64> {
    a.checked_sub(b).ok_or(PoolError::Underflow)
}
