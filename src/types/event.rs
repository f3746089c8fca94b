//! Ledger and registry events.
//!
//! Every committed state change appends exactly one event per affected
//! entity (bookings append one `BidAskPurchased` per leg). Events are the
//! sole channel external observers use to stay in sync; each is
//! self-describing and carries enough data to update a read model without
//! further queries.

use crate::types::Address;

/// A state-change notification, appended in commit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A trader was registered.
    TraderAdded {
        id: u64,
        name: String,
        owner: Address,
        logo: String,
    },

    /// A trader's name, owner, or logo changed.
    TraderUpdated {
        id: u64,
        name: String,
        owner: Address,
        logo: String,
    },

    /// A trader was soft-deleted; its offers are now unbookable.
    TraderRemoved { id: u64 },

    /// An offer was posted.
    BidAskAdded { id: u64, trader_id: u64 },

    /// An offer's price or quantity changed.
    BidAskUpdated { id: u64 },

    /// An offer was soft-deleted.
    BidAskRemoved { id: u64 },

    /// One leg of a booking. A two-leg booking emits two of these sharing
    /// the same `purchase_id`.
    BidAskPurchased {
        purchase_id: u64,
        bid_ask_id: u64,
        buyer: Address,
        first_name: String,
        last_name: String,
    },

    /// The ledger (or registry) owner changed.
    OwnershipTransferred { previous: Address, new: Address },

    /// The circuit breaker engaged.
    Paused,

    /// The circuit breaker released.
    Unpaused,

    /// The registry now points at a new backend.
    BackendChanged { previous: Address, new: Address },
}

/// An event together with its position in the append-only log.
///
/// Sequence numbers start at 1 and are gap-free within a log. Reconnecting
/// subscribers replay from a known sequence and deduplicate by `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedEvent {
    /// 1-based position in the log, strictly increasing.
    pub seq: u64,

    /// The state change itself.
    pub event: Event,
}

// ============================================================================
// Unit Tests
// ============================================================================
