//! Protocol Constants
//!
//! Token metadata, addresses and the caller-facing failure messages.
//! The messages are part of the public interface: clients and test
//! harnesses match on them, so they never change between releases.

/// Native asset metadata
pub mod token {
    /// Asset name
    pub const NAME: &str = "Bitcoin";
    /// Asset symbol
    pub const SYMBOL: &str = "BTC";
    /// Decimal places
    pub const DECIMALS: u8 = 8;
    /// One unit with decimals (1 BTC = 100_000_000 sats)
    pub const ONE: u64 = 100_000_000;
}

/// Well-known addresses
pub mod addresses {
    use crate::types::Address;

    /// The all-zero address, never a valid participant or team identity
    pub const ZERO: Address = [0u8; 32];
}

/// Stable failure messages
pub mod messages {
    /// Deposit submitted without attached value
    pub const ZERO_VALUE: &str = "Deposit value must be greater than zero";
    /// Reward injection from anyone but the team
    pub const UNAUTHORIZED: &str = "Only team can call this function";
    /// Reward injection while nobody has principal in the pool
    pub const NO_DEPOSITS: &str = "No deposits";
    /// Withdrawal larger than principal + reward
    pub const EXCEEDS_BALANCE: &str = "Withdraw amount exceeds balance";
    /// Outgoing asset transfer rejected
    pub const TRANSFER_FAILED: &str = "Transfer failed";
    /// State-mutating call while a withdrawal transfer is in flight
    pub const REENTRANT_CALL: &str = "Reentrant call";
    /// Arithmetic overflow
    pub const OVERFLOW: &str = "Arithmetic overflow";
    /// Arithmetic underflow
    pub const UNDERFLOW: &str = "Arithmetic underflow";
    /// Division by zero
    pub const DIVISION_BY_ZERO: &str = "Division by zero";
    /// Address rejected
    pub const INVALID_ADDRESS: &str = "Invalid address";
    /// Ledger totals do not match participant balances
    pub const INVARIANT_VIOLATED: &str = "Ledger invariant violated";
    /// Proposed state does not match re-executed state
    pub const INVALID_STATE_TRANSITION: &str = "Invalid state transition";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_messages_are_stable() {
        assert_eq!(messages::UNAUTHORIZED, "Only team can call this function");
        assert_eq!(messages::NO_DEPOSITS, "No deposits");
        assert_eq!(messages::EXCEEDS_BALANCE, "Withdraw amount exceeds balance");
    }

    #[test]
    fn test_token_unit() {
        assert_eq!(token::ONE, 10u64.pow(token::DECIMALS as u32));
    }
}
