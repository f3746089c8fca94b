//! Trader records (exchange listings).
//!
//! A `Trader` is a listing registered by the ledger owner and controlled by
//! its own `owner` account. Despite the name it represents a venue/currency
//! listing, not a person. Names are unique among *active* traders only;
//! removing a trader retires its id forever but frees the name for reuse.

use crate::types::Address;

/// Minimum trader name length in bytes.
pub const NAME_MIN_LEN: usize = 1;

/// Maximum trader name length in bytes.
///
/// Names were fixed-width 32-byte fields in the original deployment; here
/// they are bounded UTF-8 strings validated at the boundary.
pub const NAME_MAX_LEN: usize = 32;

/// Maximum logo reference length in bytes.
pub const LOGO_MAX_LEN: usize = 64;

/// Well-known logo reference used when a trader is registered without one.
///
/// This is the content hash of the stock logo in the external blob store;
/// the ledger never touches the blob itself, only this opaque reference.
pub const DEFAULT_LOGO: &str = "QmSGwhJNAqoDmtZXXtaE57Hs95Ys149q8cuhKbSqV1NSEc";

/// An exchange listing.
///
/// ## Lifecycle
///
/// Created by `add_trader` (ledger owner only), mutated by `edit_trader`
/// (name, owner, and logo only; the id is permanent), soft-deleted by
/// `remove_trader`, which clears the record and frees the name while
/// retiring the id forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trader {
    /// Sequential identifier, assigned at creation, never reused.
    pub id: u64,

    /// Listing name, 1-32 bytes, unique among active traders.
    pub name: String,

    /// Account that controls this trader's offers.
    pub owner: Address,

    /// Opaque content-addressed logo reference.
    pub logo: String,

    /// False once the trader has been removed.
    pub active: bool,
}

impl Trader {
    /// Create a new active trader record.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        owner: Address,
        logo: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            logo: logo.into(),
            active: true,
        }
    }

    /// Soft-delete this record: clear every field except the retired id.
    pub fn retire(&mut self) {
        self.name.clear();
        self.logo.clear();
        self.owner = Address::ZERO;
        self.active = false;
    }
}

/// Validate a trader name: 1-32 bytes, exact byte semantics (case-sensitive).
pub fn valid_name(name: &str) -> bool {
    (NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name.len())
}

/// Validate a logo reference. Empty is allowed; the ledger substitutes
/// [`DEFAULT_LOGO`] for it.
pub fn valid_logo(logo: &str) -> bool {
    logo.len() <= LOGO_MAX_LEN
}

// ============================================================================
// Unit Tests
// ============================================================================
