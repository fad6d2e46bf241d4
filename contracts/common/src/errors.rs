//! Error Types for the Reward Pool
//!
//! Every failure aborts the whole operation. Variants carry enough context
//! for debugging while `message()` stays fixed for callers.

use core::fmt;

use crate::constants::messages;
use crate::types::Address;

/// Result type alias for reward pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Main error enum for all reward pool errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    // ============ Amount Errors ============
    /// Deposit or reward injection carried no value
    ZeroValue,

    /// Withdrawal exceeds principal + reward
    InsufficientBalance { available: u64, requested: u64 },

    // ============ Authorization Errors ============
    /// Caller is not the privileged identity
    Unauthorized { expected: Address, actual: Address },

    /// Address is not usable for this role
    InvalidAddress {
        /// Description of why the address is invalid
        reason: &'static str,
    },

    // ============ Pool Errors ============
    /// Reward injection with no principal to attribute it to
    NoDeposits,

    /// Nested state-mutating call during an outgoing transfer
    Reentrancy,

    // ============ Transfer Errors ============
    /// Outgoing asset transfer failed
    TransferFailed { to: Address, amount: u64 },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    /// Division by zero
    DivisionByZero,

    // ============ State Errors ============
    /// Stored totals disagree with participant balances
    InvariantViolated { reason: &'static str },

    /// Proposed output state is not the result of the action
    InvalidStateTransition,
}

impl PoolError {
    /// Returns a stable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroValue => "E010_ZERO_VALUE",
            Self::InsufficientBalance { .. } => "E011_INSUFFICIENT_BALANCE",
            Self::Unauthorized { .. } => "E020_UNAUTHORIZED",
            Self::InvalidAddress { .. } => "E021_INVALID_ADDRESS",
            Self::NoDeposits => "E030_NO_DEPOSITS",
            Self::Reentrancy => "E031_REENTRANCY",
            Self::TransferFailed { .. } => "E040_TRANSFER_FAILED",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
            Self::InvariantViolated { .. } => "E100_INVARIANT",
            Self::InvalidStateTransition => "E101_INVALID_STATE",
        }
    }

    /// Returns the fixed caller-facing message
    pub fn message(&self) -> &'static str {
        match self {
            Self::ZeroValue => messages::ZERO_VALUE,
            Self::InsufficientBalance { .. } => messages::EXCEEDS_BALANCE,
            Self::Unauthorized { .. } => messages::UNAUTHORIZED,
            Self::InvalidAddress { .. } => messages::INVALID_ADDRESS,
            Self::NoDeposits => messages::NO_DEPOSITS,
            Self::Reentrancy => messages::REENTRANT_CALL,
            Self::TransferFailed { .. } => messages::TRANSFER_FAILED,
            Self::Overflow => messages::OVERFLOW,
            Self::Underflow => messages::UNDERFLOW,
            Self::DivisionByZero => messages::DIVISION_BY_ZERO,
            Self::InvariantViolated { .. } => messages::INVARIANT_VIOLATED,
            Self::InvalidStateTransition => messages::INVALID_STATE_TRANSITION,
        }
    }

    /// Returns true if the caller can fix the request and resubmit
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ZeroValue
                | Self::InsufficientBalance { .. }
                | Self::NoDeposits
                | Self::TransferFailed { .. }
        )
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PoolError {}
