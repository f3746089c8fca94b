//! BidAsk records (tradeable offers).
//!
//! A `BidAsk` is a priced, quantity-limited offer posted against a trader.
//! Ids are globally sequential across all traders. Only `price` and
//! `quantity` are mutable after creation; the currency-pair labels and the
//! owning trader are fixed for the life of the offer.

/// Minimum currency-pair label length in bytes.
pub const LABEL_MIN_LEN: usize = 1;

/// Maximum currency-pair label length in bytes.
pub const LABEL_MAX_LEN: usize = 32;

/// A tradeable offer belonging to a trader.
///
/// ## Validity window
///
/// `origin_time` / `destination_time` are advisory unix-epoch timestamps
/// (0 = unset). The booking algorithm never enforces them; callers that care
/// filter on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidAsk {
    /// Sequential identifier, global across all traders, never reused.
    pub id: u64,

    /// Owning trader. That trader's `owner` account controls this offer.
    pub trader_id: u64,

    /// Source currency label, 1-32 bytes.
    pub from: String,

    /// Destination currency label, 1-32 bytes.
    pub to: String,

    /// Price per unit in smallest units.
    pub price: u64,

    /// Remaining unfilled units. Decremented on purchase, never negative.
    pub quantity: u64,

    /// Advisory validity-window start (unix seconds, 0 = unset).
    pub origin_time: u64,

    /// Advisory validity-window end (unix seconds, 0 = unset).
    pub destination_time: u64,

    /// False once the offer has been removed.
    pub active: bool,
}

impl BidAsk {
    /// Create a new active offer.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        trader_id: u64,
        from: impl Into<String>,
        to: impl Into<String>,
        price: u64,
        quantity: u64,
        origin_time: u64,
        destination_time: u64,
    ) -> Self {
        Self {
            id,
            trader_id,
            from: from.into(),
            to: to.into(),
            price,
            quantity,
            origin_time,
            destination_time,
            active: true,
        }
    }

    /// Whether this offer trades exactly the given pair (byte equality).
    pub fn matches_pair(&self, from: &str, to: &str) -> bool {
        self.from == from && self.to == to
    }

    /// Consume one unit for a booking leg.
    ///
    /// Returns false (and changes nothing) if no quantity remains.
    pub fn fill_one(&mut self) -> bool {
        if self.quantity == 0 {
            return false;
        }
        self.quantity -= 1;
        true
    }

    /// Soft-delete this offer.
    pub fn retire(&mut self) {
        self.active = false;
    }
}

/// Validate a currency-pair label: 1-32 bytes.
pub fn valid_label(label: &str) -> bool {
    (LABEL_MIN_LEN..=LABEL_MAX_LEN).contains(&label.len())
}

// ============================================================================
// Unit Tests
// ============================================================================
