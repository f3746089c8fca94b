//! Snapshot persistence and state roots.
//!
//! ## SSZ Serialization
//!
//! The live ledger stores bounded UTF-8 strings; the snapshot mirrors every
//! record into fixed-width SSZ containers (names, labels, and logos as
//! bounded byte lists, addresses as 20-byte arrays) so that encoding is
//! deterministic: the same ledger state always produces identical bytes,
//! and the SHA-256 of those bytes serves as a verifiable state root.
//!
//! ## Restarts
//!
//! A snapshot carries the id counters and the event sequence alongside the
//! records. Restoring rebuilds every index and resumes the counters exactly
//! where they were; ids and sequence numbers never rewind across restarts.
//!
//! ## Capacity
//!
//! SSZ lists need static maxima. The bounds below are generous for the
//! intended deployment size; a ledger that outgrows them fails the snapshot
//! with `InvalidState` rather than truncating silently.
//!
//! ## Example
//!
//! ```
//! use trader_exchange::{Address, Exchange};
//!
//! let admin = Address::from_low_u64(1);
//! let mut exchange = Exchange::new(admin);
//! exchange
//!     .add_trader(admin, "Nordic FX", Address::from_low_u64(2), "")
//!     .unwrap();
//!
//! let snapshot = exchange.snapshot().unwrap();
//! let restored = Exchange::restore(&snapshot).unwrap();
//!
//! assert_eq!(restored.trader_count(), 1);
//! assert_eq!(restored.state_root().unwrap(), exchange.state_root().unwrap());
//! ```

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::engine::access::AccessControl;
use crate::engine::events::EventLog;
use crate::engine::exchange::Exchange;
use crate::error::ExchangeError;
use crate::store::{BidAskBook, PurchaseLedger, TraderBook};
use crate::types::{
    Address, BidAsk, Purchase, Trader, ADDRESS_LEN, CUSTOMER_NAME_MAX_LEN, LABEL_MAX_LEN,
    LOGO_MAX_LEN, NAME_MAX_LEN,
};

/// Maximum number of trader records (tombstones included) in a snapshot.
pub const SNAPSHOT_TRADERS_MAX: usize = 1024;

/// Maximum number of offer records (tombstones included) in a snapshot.
pub const SNAPSHOT_BID_ASKS_MAX: usize = 8192;

/// Maximum number of purchase records in a snapshot.
pub const SNAPSHOT_PURCHASES_MAX: usize = 65536;

// ============================================================================
// SSZ mirror records
// ============================================================================

/// Counters and flags that must survive a restart.
#[derive(Debug, Clone, PartialEq, Default, SimpleSerialize)]
pub struct LedgerHeader {
    /// Next trader id to assign.
    pub next_trader_id: u64,

    /// Next offer id to assign.
    pub next_bid_ask_id: u64,

    /// Next purchase id to assign.
    pub next_purchase_id: u64,

    /// Next event sequence number.
    pub next_event_seq: u64,

    /// Ledger owner account.
    pub owner: [u8; ADDRESS_LEN],

    /// Circuit breaker state.
    pub paused: bool,

    /// Terminal destroy flag.
    pub destroyed: bool,
}

/// SSZ mirror of a [`Trader`] record.
#[derive(Debug, Clone, PartialEq, Default, SimpleSerialize)]
pub struct TraderRecord {
    pub id: u64,
    pub name: List<u8, NAME_MAX_LEN>,
    pub owner: [u8; ADDRESS_LEN],
    pub logo: List<u8, LOGO_MAX_LEN>,
    pub active: bool,
}

/// SSZ mirror of a [`BidAsk`] record.
#[derive(Debug, Clone, PartialEq, Default, SimpleSerialize)]
pub struct BidAskRecord {
    pub id: u64,
    pub trader_id: u64,
    pub from: List<u8, LABEL_MAX_LEN>,
    pub to: List<u8, LABEL_MAX_LEN>,
    pub price: u64,
    pub quantity: u64,
    pub origin_time: u64,
    pub destination_time: u64,
    pub active: bool,
}

/// SSZ mirror of a [`Purchase`] record.
///
/// The second leg uses the zero id as a "no second leg" sentinel; offer ids
/// start at 1, so the sentinel can never collide with a real leg.
#[derive(Debug, Clone, PartialEq, Default, SimpleSerialize)]
pub struct PurchaseRecord {
    pub id: u64,
    pub leg1: u64,
    pub leg2: u64,
    pub buyer: [u8; ADDRESS_LEN],
    pub first_name: List<u8, CUSTOMER_NAME_MAX_LEN>,
    pub last_name: List<u8, CUSTOMER_NAME_MAX_LEN>,
    pub amount_paid: u64,
}

/// The full persisted state of an exchange ledger.
#[derive(Debug, Clone, PartialEq, Default, SimpleSerialize)]
pub struct LedgerSnapshot {
    pub header: LedgerHeader,
    pub traders: List<TraderRecord, SNAPSHOT_TRADERS_MAX>,
    pub bid_asks: List<BidAskRecord, SNAPSHOT_BID_ASKS_MAX>,
    pub purchases: List<PurchaseRecord, SNAPSHOT_PURCHASES_MAX>,
}

// ============================================================================
// Conversions
// ============================================================================

fn bytes_list<const N: usize>(bytes: &[u8]) -> Result<List<u8, N>, ExchangeError> {
    List::<u8, N>::try_from(bytes.to_vec()).map_err(|_| ExchangeError::InvalidState)
}

fn list_string<const N: usize>(list: &List<u8, N>) -> Result<String, ExchangeError> {
    String::from_utf8(list.to_vec()).map_err(|_| ExchangeError::InvalidInput)
}

impl TraderRecord {
    fn from_trader(trader: &Trader) -> Result<Self, ExchangeError> {
        Ok(Self {
            id: trader.id,
            name: bytes_list(trader.name.as_bytes())?,
            owner: *trader.owner.as_bytes(),
            logo: bytes_list(trader.logo.as_bytes())?,
            active: trader.active,
        })
    }

    fn to_trader(&self) -> Result<Trader, ExchangeError> {
        Ok(Trader {
            id: self.id,
            name: list_string(&self.name)?,
            owner: Address::new(self.owner),
            logo: list_string(&self.logo)?,
            active: self.active,
        })
    }
}

impl BidAskRecord {
    fn from_bid_ask(offer: &BidAsk) -> Result<Self, ExchangeError> {
        Ok(Self {
            id: offer.id,
            trader_id: offer.trader_id,
            from: bytes_list(offer.from.as_bytes())?,
            to: bytes_list(offer.to.as_bytes())?,
            price: offer.price,
            quantity: offer.quantity,
            origin_time: offer.origin_time,
            destination_time: offer.destination_time,
            active: offer.active,
        })
    }

    fn to_bid_ask(&self) -> Result<BidAsk, ExchangeError> {
        Ok(BidAsk {
            id: self.id,
            trader_id: self.trader_id,
            from: list_string(&self.from)?,
            to: list_string(&self.to)?,
            price: self.price,
            quantity: self.quantity,
            origin_time: self.origin_time,
            destination_time: self.destination_time,
            active: self.active,
        })
    }
}

impl PurchaseRecord {
    fn from_purchase(purchase: &Purchase) -> Result<Self, ExchangeError> {
        Ok(Self {
            id: purchase.id,
            leg1: purchase.bid_ask_ids.first().copied().unwrap_or(0),
            leg2: purchase.bid_ask_ids.get(1).copied().unwrap_or(0),
            buyer: *purchase.buyer.as_bytes(),
            first_name: bytes_list(purchase.first_name.as_bytes())?,
            last_name: bytes_list(purchase.last_name.as_bytes())?,
            amount_paid: purchase.amount_paid,
        })
    }

    fn to_purchase(&self) -> Result<Purchase, ExchangeError> {
        let bid_ask_ids = if self.leg2 == 0 {
            vec![self.leg1]
        } else {
            vec![self.leg1, self.leg2]
        };
        Ok(Purchase {
            id: self.id,
            bid_ask_ids,
            buyer: Address::new(self.buyer),
            first_name: list_string(&self.first_name)?,
            last_name: list_string(&self.last_name)?,
            amount_paid: self.amount_paid,
        })
    }
}

// ============================================================================
// Snapshot operations
// ============================================================================

impl LedgerSnapshot {
    /// Deterministic SSZ encoding of the snapshot.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ExchangeError> {
        ssz_rs::serialize(self).map_err(|_| ExchangeError::InvalidState)
    }

    /// Decode a snapshot from its SSZ encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExchangeError> {
        ssz_rs::deserialize(bytes).map_err(|_| ExchangeError::InvalidInput)
    }

    /// SHA-256 over the deterministic encoding.
    pub fn state_root(&self) -> Result<[u8; 32], ExchangeError> {
        let bytes = self.to_bytes()?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hasher.finalize();

        let mut root = [0u8; 32];
        root.copy_from_slice(&digest);
        Ok(root)
    }

    /// The state root as a hex string.
    pub fn state_root_hex(&self) -> Result<String, ExchangeError> {
        Ok(hex::encode(self.state_root()?))
    }
}

impl Exchange {
    /// Capture the full persisted state of this ledger.
    ///
    /// Fails with `InvalidState` if any book has outgrown the snapshot
    /// capacity bounds.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, ExchangeError> {
        let header = LedgerHeader {
            next_trader_id: self.traders_book().peek_next_id(),
            next_bid_ask_id: self.bid_asks_book().peek_next_id(),
            next_purchase_id: self.purchases_ledger().peek_next_id(),
            next_event_seq: self.event_log().next_seq(),
            owner: *self.owner().as_bytes(),
            paused: self.paused(),
            destroyed: self.destroyed(),
        };

        let traders = self
            .traders_book()
            .iter_all()
            .map(TraderRecord::from_trader)
            .collect::<Result<Vec<_>, _>>()?;
        let bid_asks = self
            .bid_asks_book()
            .iter_all()
            .map(BidAskRecord::from_bid_ask)
            .collect::<Result<Vec<_>, _>>()?;
        let purchases = self
            .purchases_ledger()
            .iter_all()
            .map(PurchaseRecord::from_purchase)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LedgerSnapshot {
            header,
            traders: List::try_from(traders).map_err(|_| ExchangeError::InvalidState)?,
            bid_asks: List::try_from(bid_asks).map_err(|_| ExchangeError::InvalidState)?,
            purchases: List::try_from(purchases).map_err(|_| ExchangeError::InvalidState)?,
        })
    }

    /// Rebuild a ledger from a snapshot, indexes and counters included.
    ///
    /// The retained event list is not part of snapshots; the sequence
    /// counter resumes so that new events continue the old numbering.
    pub fn restore(snapshot: &LedgerSnapshot) -> Result<Exchange, ExchangeError> {
        let mut traders = TraderBook::with_capacity(snapshot.traders.len());
        for record in snapshot.traders.iter() {
            traders.restore_record(record.to_trader()?);
        }
        traders.set_next_id(snapshot.header.next_trader_id);

        let mut bid_asks = BidAskBook::with_capacity(snapshot.bid_asks.len());
        for record in snapshot.bid_asks.iter() {
            bid_asks.restore_record(record.to_bid_ask()?);
        }
        bid_asks.set_next_id(snapshot.header.next_bid_ask_id);

        let mut purchases = PurchaseLedger::with_capacity(snapshot.purchases.len());
        for record in snapshot.purchases.iter() {
            purchases.restore_record(record.to_purchase()?);
        }
        purchases.set_next_id(snapshot.header.next_purchase_id);

        let access = AccessControl::from_flags(
            Address::new(snapshot.header.owner),
            snapshot.header.paused,
            snapshot.header.destroyed,
        );

        let mut events = EventLog::new();
        events.set_next_seq(snapshot.header.next_event_seq);

        Ok(Exchange::from_parts(
            access, traders, bid_asks, purchases, events,
        ))
    }

    /// SHA-256 state root of the current ledger state.
    pub fn state_root(&self) -> Result<[u8; 32], ExchangeError> {
        self.snapshot()?.state_root()
    }

    /// The state root as a hex string.
    pub fn state_root_hex(&self) -> Result<String, ExchangeError> {
        self.snapshot()?.state_root_hex()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
