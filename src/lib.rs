//! # Trader Exchange
//!
//! A small marketplace ledger with a registry for live upgrades.
//!
//! ## Architecture
//!
//! - **Types**: core records (Address, Trader, BidAsk, Purchase, Event)
//! - **Store**: slab-backed entity books with uniqueness and ownership
//!   indexes
//! - **Engine**: access control, the append-only event log, and the
//!   `Exchange` facade with the atomic booking algorithm
//! - **Registry**: backend pointer indirection with an append-only history
//! - **Snapshot**: deterministic SSZ persistence and SHA-256 state roots
//!
//! ## Design Principles
//!
//! 1. **Serialized writes**: the ledger is a single-writer state machine;
//!    every mutation is atomic and totally ordered
//! 2. **No floating point**: all money is `u64` smallest units (10^8 scale)
//! 3. **Events as the sync channel**: observers follow the sequenced event
//!    log, never poll internal state
//! 4. **Synchronous core**: no async in the commit path; subscriber fan-out
//!    never blocks a commit
//!
//! ## Example
//!
//! ```
//! use trader_exchange::{Address, Exchange, Registry};
//! use trader_exchange::types::money::to_units;
//!
//! let admin = Address::from_low_u64(1);
//! let venue = Address::from_low_u64(2);
//! let buyer = Address::from_low_u64(3);
//!
//! // The registry tells clients which ledger instance is authoritative.
//! let ledger_v1 = Address::from_low_u64(100);
//! let registry = Registry::new(admin, ledger_v1);
//! assert_eq!(registry.backend(), ledger_v1);
//!
//! // The ledger itself: list a trader, post an offer, book it.
//! let mut exchange = Exchange::new(admin);
//! let trader = exchange.add_trader(admin, "Nordic FX", venue, "").unwrap();
//! let price = to_units("0.5").unwrap();
//! let offer = exchange
//!     .add_bid_ask(venue, trader, "EUR", "USD", price, 10, 0, 0)
//!     .unwrap();
//! let purchase = exchange
//!     .book(buyer, &[offer], "Ada", "Lovelace", price)
//!     .unwrap();
//! assert_eq!(purchase, 1);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Error taxonomy shared by every command
pub mod error;

/// Core data types: Address, Trader, BidAsk, Purchase, Event
pub mod types;

/// Entity store: slab-backed books
pub mod store;

/// Ledger engine: access control, event log, exchange facade
pub mod engine;

/// Registry: backend pointer with upgrade history
pub mod registry;

/// Snapshot persistence and state roots
pub mod snapshot;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use engine::{AccessControl, EventLog, EventSubscription, Exchange};
pub use error::ExchangeError;
pub use registry::Registry;
pub use snapshot::LedgerSnapshot;
pub use store::{BidAskBook, PurchaseLedger, TraderBook, FIND_RESULTS_MAX};
pub use types::{Address, BidAsk, Event, Purchase, SequencedEvent, Trader};
