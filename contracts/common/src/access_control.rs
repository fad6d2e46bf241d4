//! Access Control Module
//!
//! The pool has exactly one privileged identity (the team). It is fixed
//! when the pool is constructed and cannot be reassigned; the only
//! privileged operation is reward injection.

use crate::types::Address;
use crate::validation::require_address;
use crate::{PoolError, PoolResult};

/// Stateless check against the immutable team identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGuard {
    team: Address,
}

impl AccessGuard {
    /// Create a guard for `team`; the zero address is rejected
    pub fn new(team: Address) -> PoolResult<Self> {
        require_address(&team, "team cannot be the zero address")?;
        Ok(Self { team })
    }

    /// The privileged identity
    pub fn team(&self) -> &Address {
        &self.team
    }

    /// Returns true if `caller` is the team
    pub fn is_privileged(&self, caller: &Address) -> bool {
        *caller == self.team
    }

    /// Fails with `Unauthorized` unless `caller` is the team
    pub fn ensure_privileged(&self, caller: &Address) -> PoolResult<()> {
        if !self.is_privileged(caller) {
            return Err(PoolError::Unauthorized {
                expected: self.team,
                actual: *caller,
            });
        }
        Ok(())
    }
}
