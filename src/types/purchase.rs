//! Purchase records: the immutable audit trail of bookings.

use crate::types::Address;

/// Maximum customer first/last name length in bytes.
pub const CUSTOMER_NAME_MAX_LEN: usize = 64;

/// Maximum number of legs in a single booking.
pub const MAX_LEGS: usize = 2;

/// An immutable record of a completed booking.
///
/// Created only by the purchase engine; never mutated or deleted afterwards.
/// A two-leg booking produces a single `Purchase` referencing both offers,
/// while one `BidAskPurchased` event is emitted per leg, all carrying this
/// record's id so subscribers can correlate the legs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    /// Sequential identifier, strictly increasing, never reused.
    pub id: u64,

    /// The booked offer ids: one or two legs.
    pub bid_ask_ids: Vec<u64>,

    /// Account that paid for the booking.
    pub buyer: Address,

    /// Customer first name as entered at booking time.
    pub first_name: String,

    /// Customer last name as entered at booking time.
    pub last_name: String,

    /// Exact amount paid in smallest units (equals the sum of leg prices).
    pub amount_paid: u64,
}

impl Purchase {
    /// Create a new purchase record.
    pub fn new(
        id: u64,
        bid_ask_ids: Vec<u64>,
        buyer: Address,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        amount_paid: u64,
    ) -> Self {
        Self {
            id,
            bid_ask_ids,
            buyer,
            first_name: first_name.into(),
            last_name: last_name.into(),
            amount_paid,
        }
    }

    /// Whether this booking covered two legs.
    pub fn is_two_leg(&self) -> bool {
        self.bid_ask_ids.len() == 2
    }
}

/// Validate a customer name field: at most 64 bytes (empty is allowed).
pub fn valid_customer_name(name: &str) -> bool {
    name.len() <= CUSTOMER_NAME_MAX_LEN
}

// ============================================================================
// Unit Tests
// ============================================================================
