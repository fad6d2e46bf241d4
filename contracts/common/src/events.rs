//! Pool Events
//!
//! Events are emitted for committed operations only and can be indexed
//! off-chain. A failed operation leaves no events behind.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::Address;

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Participant Events (0x01 - 0x1F)
    ParticipantRegistered = 0x01,
    Deposited = 0x02,
    Withdrawn = 0x03,

    // Reward Events (0x20 - 0x3F)
    RewardsDistributed = 0x20,
}

/// Main event enum containing all pool events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolEvent {
    /// Emitted on a participant's first deposit
    ParticipantRegistered {
        participant: Address,
        registry_index: u64,
        block_height: u64,
    },

    /// Emitted when principal is deposited
    Deposited {
        depositor: Address,
        amount: u64,
        new_principal: u64,
        total_principal: u64,
        block_height: u64,
    },

    /// Emitted when the team injects rewards
    RewardsDistributed {
        team: Address,
        amount: u64,
        distributed: u64,
        dust: u64,
        recipients: u64,
        total_rewards: u64,
        block_height: u64,
    },

    /// Emitted when a participant withdraws
    Withdrawn {
        participant: Address,
        amount: u64,
        reward_drawn: u64,
        principal_drawn: u64,
        block_height: u64,
    },
}

impl PoolEvent {
    /// Get the event type
    pub fn event_type(&self) -> EventType {
        match self {
            Self::ParticipantRegistered { .. } => EventType::ParticipantRegistered,
            Self::Deposited { .. } => EventType::Deposited,
            Self::RewardsDistributed { .. } => EventType::RewardsDistributed,
            Self::Withdrawn { .. } => EventType::Withdrawn,
        }
    }

    /// Get the block height when event occurred
    pub fn block_height(&self) -> u64 {
        match self {
            Self::ParticipantRegistered { block_height, .. } => *block_height,
            Self::Deposited { block_height, .. } => *block_height,
            Self::RewardsDistributed { block_height, .. } => *block_height,
            Self::Withdrawn { block_height, .. } => *block_height,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<PoolEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    /// Move all events of `other` into this log
    pub fn append(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    /// Get all events
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<PoolEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&PoolEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
