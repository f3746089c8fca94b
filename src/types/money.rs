//! Fixed-point money utilities.
//!
//! ## Overview
//!
//! All prices and paid amounts in the ledger are `u64` values denominated in
//! the smallest unit of value. Values are scaled by 10^8.
//!
//! ## Why Fixed-Point?
//!
//! Floating-point arithmetic can produce different results on different
//! hardware, breaking determinism and, for money, correctness. The core only
//! ever computes on integers; `rust_decimal` is used strictly at the boundary
//! to convert human-readable decimal strings to smallest units and back.
//!
//! ## Examples
//!
//! ```
//! use trader_exchange::types::money::{from_units, to_units, SCALE};
//!
//! // Convert 0.50000000 to smallest units
//! let price = to_units("0.5").unwrap();
//! assert_eq!(price, 50_000_000);
//!
//! // Convert back to a string
//! assert_eq!(from_units(price), "0.50000000");
//! assert_eq!(SCALE, 100_000_000);
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Scaling factor for fixed-point amounts: 10^8.
///
/// This provides 8 decimal places of precision.
pub const SCALE: u64 = 100_000_000;

/// Maximum whole-unit value that can be safely represented.
///
/// u64::MAX / SCALE is roughly 184 billion whole units.
pub const MAX_VALUE: u64 = u64::MAX / SCALE;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert a decimal string to smallest units.
///
/// # Arguments
///
/// * `s` - Decimal string (e.g., "0.5", "120.12345678")
///
/// # Returns
///
/// * `Some(u64)` - The smallest-unit representation
/// * `None` - If parsing fails or the value is negative or out of range
///
/// # Example
///
/// ```
/// use trader_exchange::types::money::to_units;
///
/// assert_eq!(to_units("1.0"), Some(100_000_000));
/// assert_eq!(to_units("0.00000001"), Some(1));
/// assert_eq!(to_units("-1"), None);
/// ```
pub fn to_units(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_units(decimal)
}

/// Convert a `Decimal` to smallest units.
///
/// Returns `None` if the value is negative or out of range.
pub fn decimal_to_units(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() {
        return None;
    }

    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    let rounded = scaled.round_dp(0);
    rounded.to_u64()
}

/// Convert smallest units to a `Decimal`.
pub fn units_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Convert smallest units to a string with 8 decimal places.
///
/// # Example
///
/// ```
/// use trader_exchange::types::money::from_units;
///
/// assert_eq!(from_units(150_000_000), "1.50000000");
/// assert_eq!(from_units(1), "0.00000001");
/// ```
pub fn from_units(value: u64) -> String {
    format!("{}.{:08}", value / SCALE, value % SCALE)
}

// ============================================================================
// Unit Tests
// ============================================================================
