//! Core data types for the trader exchange ledger.
//!
//! ## Types
//!
//! - [`Address`]: opaque fixed-width account identifier
//! - [`Trader`]: an exchange listing owned by an account
//! - [`BidAsk`]: a priced, quantity-limited offer belonging to a trader
//! - [`Purchase`]: the immutable audit record of a booking
//! - [`Event`] / [`SequencedEvent`]: self-describing state-change
//!   notifications
//!
//! ## Money
//!
//! All prices and paid amounts are `u64` smallest units scaled by 10^8; see
//! [`money`] for boundary conversion. No floating point in the core.

mod address;
mod bidask;
mod event;
mod purchase;
mod trader;

pub mod money;

// Re-export all types at module level
pub use address::{Address, ParseAddressError, ADDRESS_LEN};
pub use bidask::{valid_label, BidAsk, LABEL_MAX_LEN, LABEL_MIN_LEN};
pub use event::{Event, SequencedEvent};
pub use purchase::{valid_customer_name, Purchase, CUSTOMER_NAME_MAX_LEN, MAX_LEGS};
pub use trader::{
    valid_logo, valid_name, Trader, DEFAULT_LOGO, LOGO_MAX_LEN, NAME_MAX_LEN, NAME_MIN_LEN,
};
