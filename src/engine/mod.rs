//! Ledger engine: access control, event log, and the exchange facade.
//!
//! ## Design Principles
//!
//! 1. **Serialized writes**: every mutating command takes `&mut self`; the
//!    ledger is a single-writer state machine and callers wanting
//!    concurrency wrap it in a lock of their choosing
//! 2. **Atomic commands**: validate everything, then commit; a failed
//!    command changes nothing
//! 3. **Synchronous execution**: no async in the commit path; subscriber
//!    fan-out is non-blocking by construction
//! 4. **Explicit dependencies**: [`AccessControl`] is a plain value held by
//!    the exchange, not ambient global state
//!
//! ## Example
//!
//! ```
//! use trader_exchange::{Address, Exchange, ExchangeError};
//!
//! let admin = Address::from_low_u64(1);
//! let mut exchange = Exchange::new(admin);
//!
//! exchange.pause(admin).unwrap();
//! let result = exchange.add_trader(admin, "Nordic FX", Address::from_low_u64(2), "");
//! assert_eq!(result, Err(ExchangeError::ContractPaused));
//! ```

pub mod access;
pub mod events;
pub mod exchange;

pub use access::AccessControl;
pub use events::{EventLog, EventSubscription, DEFAULT_SUBSCRIBER_CAPACITY};
pub use exchange::Exchange;
