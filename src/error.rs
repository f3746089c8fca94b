//! Error taxonomy for the exchange ledger and registry.
//!
//! Every mutating command either fully commits or fails with exactly one of
//! these kinds and leaves all state, counters, and the event log untouched.
//! The kinds are deliberately coarse so a caller can tell apart
//! "try again later" (`ContractPaused`), "never valid" (`InvalidInput`),
//! and "someone beat you to it" (`InsufficientQuantity`, `DuplicateName`).

use thiserror::Error;

/// Failure kinds surfaced by ledger and registry commands.
///
/// ## Example
///
/// ```
/// use trader_exchange::{Address, Exchange, ExchangeError};
///
/// let owner = Address::from_low_u64(1);
/// let mut exchange = Exchange::new(owner);
///
/// // A non-owner cannot register a listing.
/// let outsider = Address::from_low_u64(9);
/// let result = exchange.add_trader(outsider, "Nordic FX", outsider, "");
/// assert_eq!(result, Err(ExchangeError::Unauthorized));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// The caller is not allowed to perform this action.
    #[error("caller is not authorized for this action")]
    Unauthorized,

    /// The referenced entity is missing, inactive, or the ledger is destroyed.
    #[error("entity not found or inactive")]
    NotFound,

    /// An active trader already holds the requested name.
    #[error("trader name is already taken")]
    DuplicateName,

    /// A field is malformed or out of range.
    #[error("malformed or out-of-range input")]
    InvalidInput,

    /// A booked offer does not have enough remaining quantity.
    #[error("offer has insufficient remaining quantity")]
    InsufficientQuantity,

    /// The paid amount does not equal the exact sum of the leg prices.
    #[error("paid amount does not match the offer total")]
    AmountMismatch,

    /// The circuit breaker is engaged; mutating commands are rejected.
    #[error("contract is paused")]
    ContractPaused,

    /// A state transition was redundant or not allowed from the current state.
    #[error("invalid state for this transition")]
    InvalidState,
}
