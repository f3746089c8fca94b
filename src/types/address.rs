//! Account addresses.
//!
//! Accounts are opaque fixed-width 20-byte identifiers, rendered and parsed
//! as 0x-prefixed hex. The ledger never interprets the bytes; it only
//! compares them for authorization and stores them for attribution.
//!
//! The all-zero address is reserved: it is never a well-formed owner, and
//! boundary validation rejects it with `InvalidInput`.

use std::fmt;
use std::str::FromStr;

/// Number of bytes in an account address.
pub const ADDRESS_LEN: usize = 20;

/// An opaque fixed-width account identifier.
///
/// ## Example
///
/// ```
/// use trader_exchange::types::Address;
///
/// let addr: Address = "0x00a329c0648769a73afac7f9381e08fb43dbea72"
///     .parse()
///     .unwrap();
/// assert!(!addr.is_zero());
/// assert_eq!(
///     addr.to_string(),
///     "0x00a329c0648769a73afac7f9381e08fb43dbea72"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// The reserved all-zero address.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Build an address from raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }

    /// Build a deterministic address with `value` written into the low bytes.
    ///
    /// Convenient for tests and demos where distinct, reproducible accounts
    /// are all that matters.
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Address(bytes)
    }

    /// Whether this is the reserved zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Error returned when parsing a malformed address literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed address literal")]
pub struct ParseAddressError;

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| ParseAddressError)?;
        if bytes.len() != ADDRESS_LEN {
            return Err(ParseAddressError);
        }
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
