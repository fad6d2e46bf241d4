//! Validation Helpers
//!
//! Guard-clause helpers shared by the pool components.
//!
//! ```rust,ignore
//! use reward_pool_common::check;
//!
//! check!(amount > 0, PoolError::ZeroValue);
//! ```

use crate::{
    constants::addresses,
    errors::{PoolError, PoolResult},
    types::Address,
};

/// Check a condition and return an error if it fails.
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

pub use check;

/// Attached value must be non-zero
pub fn require_value(value: u64) -> PoolResult<()> {
    check!(value > 0, PoolError::ZeroValue);
    Ok(())
}

/// Address must not be the zero address
pub fn require_address(address: &Address, reason: &'static str) -> PoolResult<()> {
    check!(*address != addresses::ZERO, PoolError::InvalidAddress { reason });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_value() {
        assert!(require_value(1).is_ok());
        assert_eq!(require_value(0), Err(PoolError::ZeroValue));
    }

    #[test]
    fn test_require_address() {
        assert!(require_address(&[7u8; 32], "unused").is_ok());
        assert_eq!(
            require_address(&[0u8; 32], "team cannot be zero"),
            Err(PoolError::InvalidAddress { reason: "team cannot be zero" })
        );
    }
}
