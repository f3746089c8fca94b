//! The exchange ledger facade.
//!
//! `Exchange` ties the entity books, access control, and event log together
//! into a single-writer, serialized state machine. Every mutating command:
//!
//! 1. runs the gates (destroyed → `NotFound`, paused → `ContractPaused`)
//! 2. checks authorization
//! 3. resolves the referenced entities
//! 4. validates inputs
//! 5. mutates the store
//! 6. appends to the event log
//!
//! Steps 1-4 touch nothing; a command that fails leaves every record,
//! counter, and the event log exactly as they were. `book` is the one
//! command spanning multiple entities, and it validates every leg before
//! decrementing any of them.
//!
//! ## Example
//!
//! ```
//! use trader_exchange::{Address, Exchange};
//! use trader_exchange::types::money::to_units;
//!
//! let admin = Address::from_low_u64(1);
//! let venue = Address::from_low_u64(2);
//! let buyer = Address::from_low_u64(3);
//!
//! let mut exchange = Exchange::new(admin);
//!
//! let trader = exchange.add_trader(admin, "Nordic FX", venue, "").unwrap();
//! let price = to_units("0.5").unwrap();
//! let offer = exchange
//!     .add_bid_ask(venue, trader, "EUR", "USD", price, 10, 0, 0)
//!     .unwrap();
//!
//! let purchase = exchange
//!     .book(buyer, &[offer], "Ada", "Lovelace", price)
//!     .unwrap();
//!
//! assert_eq!(purchase, 1);
//! assert_eq!(exchange.bid_ask(offer).unwrap().quantity, 9);
//! ```

use crate::engine::access::AccessControl;
use crate::engine::events::{EventLog, EventSubscription};
use crate::error::ExchangeError;
use crate::store::{BidAskBook, PurchaseLedger, TraderBook};
use crate::types::{
    valid_customer_name, valid_label, valid_logo, valid_name, Address, BidAsk, Event, Purchase,
    SequencedEvent, Trader, DEFAULT_LOGO, MAX_LEGS,
};

/// The marketplace ledger: entity store, purchase engine, circuit breaker,
/// and event log behind one serialized facade.
#[derive(Debug, Clone)]
pub struct Exchange {
    access: AccessControl,
    traders: TraderBook,
    bid_asks: BidAskBook,
    purchases: PurchaseLedger,
    events: EventLog,
}

impl Exchange {
    /// Create a ledger owned by `owner`.
    pub fn new(owner: Address) -> Self {
        Self {
            access: AccessControl::new(owner),
            traders: TraderBook::new(),
            bid_asks: BidAskBook::new(),
            purchases: PurchaseLedger::new(),
            events: EventLog::new(),
        }
    }

    /// Create a ledger with pre-allocated book capacities.
    pub fn with_capacity(owner: Address, traders: usize, offers: usize) -> Self {
        Self {
            access: AccessControl::new(owner),
            traders: TraderBook::with_capacity(traders),
            bid_asks: BidAskBook::with_capacity(offers),
            purchases: PurchaseLedger::with_capacity(offers),
            events: EventLog::new(),
        }
    }

    /// Rebuild a ledger from restored parts. Used by the snapshot layer.
    pub(crate) fn from_parts(
        access: AccessControl,
        traders: TraderBook,
        bid_asks: BidAskBook,
        purchases: PurchaseLedger,
        events: EventLog,
    ) -> Self {
        Self {
            access,
            traders,
            bid_asks,
            purchases,
            events,
        }
    }

    // ========================================================================
    // Access control commands
    // ========================================================================

    /// Hand ledger ownership to `new_owner`.
    ///
    /// Owner-only; exempt from the pause gate (emergency-recovery path).
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), ExchangeError> {
        let previous = self.access.transfer_ownership(caller, new_owner)?;
        self.events.emit(Event::OwnershipTransferred {
            previous,
            new: new_owner,
        });
        Ok(())
    }

    /// Engage the circuit breaker: every mutating command fails
    /// `ContractPaused` until [`Exchange::unpause`].
    pub fn pause(&mut self, caller: Address) -> Result<(), ExchangeError> {
        self.access.pause(caller)?;
        self.events.emit(Event::Paused);
        Ok(())
    }

    /// Release the circuit breaker.
    pub fn unpause(&mut self, caller: Address) -> Result<(), ExchangeError> {
        self.access.unpause(caller)?;
        self.events.emit(Event::Unpaused);
        Ok(())
    }

    /// Irreversibly tear the ledger down.
    ///
    /// Owner-only and the circuit breaker must already be engaged. All
    /// records are dropped; afterwards every command fails `NotFound` and
    /// queries read an empty ledger. The retained event log survives as the
    /// notification trail of what happened.
    pub fn destroy(&mut self, caller: Address) -> Result<(), ExchangeError> {
        self.access.destroy(caller)?;
        self.traders.clear();
        self.bid_asks.clear();
        self.purchases.clear();
        Ok(())
    }

    // ========================================================================
    // Trader commands (ledger-owner-gated)
    // ========================================================================

    /// Register a new trader listing and return its id.
    ///
    /// An empty `logo` is replaced with the well-known default reference.
    pub fn add_trader(
        &mut self,
        caller: Address,
        name: &str,
        owner: Address,
        logo: &str,
    ) -> Result<u64, ExchangeError> {
        self.access.require_live()?;
        self.access.require_unpaused()?;
        self.access.require_owner(caller)?;

        if !valid_name(name) || owner.is_zero() || !valid_logo(logo) {
            return Err(ExchangeError::InvalidInput);
        }
        if self.traders.contains_name(name) {
            return Err(ExchangeError::DuplicateName);
        }

        let logo = if logo.is_empty() { DEFAULT_LOGO } else { logo };
        let id = self.traders.insert(name, owner, logo);
        self.events.emit(Event::TraderAdded {
            id,
            name: name.to_string(),
            owner,
            logo: logo.to_string(),
        });

        Ok(id)
    }

    /// Edit an active trader's name, owner, and logo (the id is permanent).
    ///
    /// Uniqueness is re-checked only when the name actually changes; an edit
    /// that keeps the current name compares against itself and skips the
    /// check.
    pub fn edit_trader(
        &mut self,
        caller: Address,
        id: u64,
        name: &str,
        owner: Address,
        logo: &str,
    ) -> Result<(), ExchangeError> {
        self.access.require_live()?;
        self.access.require_unpaused()?;
        self.access.require_owner(caller)?;

        let current = self.traders.get(id).ok_or(ExchangeError::NotFound)?;
        if !valid_name(name) || owner.is_zero() || !valid_logo(logo) {
            return Err(ExchangeError::InvalidInput);
        }
        if name != current.name && self.traders.contains_name(name) {
            return Err(ExchangeError::DuplicateName);
        }

        let logo = if logo.is_empty() { DEFAULT_LOGO } else { logo };
        self.traders.update(id, name, owner, logo);
        self.events.emit(Event::TraderUpdated {
            id,
            name: name.to_string(),
            owner,
            logo: logo.to_string(),
        });

        Ok(())
    }

    /// Soft-delete an active trader.
    ///
    /// Frees the name, retires the id forever, and leaves the trader's
    /// offers in storage, unbookable and unlisted from now on.
    pub fn remove_trader(&mut self, caller: Address, id: u64) -> Result<(), ExchangeError> {
        self.access.require_live()?;
        self.access.require_unpaused()?;
        self.access.require_owner(caller)?;

        if !self.traders.retire(id) {
            return Err(ExchangeError::NotFound);
        }
        self.events.emit(Event::TraderRemoved { id });

        Ok(())
    }

    // ========================================================================
    // BidAsk commands (trader-owner-gated)
    // ========================================================================

    /// Post a new offer against a trader and return its id.
    ///
    /// Only the trader's `owner` account may post. Labels are 1-32 bytes,
    /// the quantity must be at least 1, the price may be any amount
    /// (including zero) in smallest units.
    #[allow(clippy::too_many_arguments)]
    pub fn add_bid_ask(
        &mut self,
        caller: Address,
        trader_id: u64,
        from: &str,
        to: &str,
        price: u64,
        quantity: u64,
        origin_time: u64,
        destination_time: u64,
    ) -> Result<u64, ExchangeError> {
        self.access.require_live()?;
        self.access.require_unpaused()?;

        let trader = self.traders.get(trader_id).ok_or(ExchangeError::NotFound)?;
        if caller != trader.owner {
            return Err(ExchangeError::Unauthorized);
        }
        if !valid_label(from) || !valid_label(to) || quantity < 1 {
            return Err(ExchangeError::InvalidInput);
        }

        let id = self
            .bid_asks
            .insert(trader_id, from, to, price, quantity, origin_time, destination_time);
        self.events.emit(Event::BidAskAdded { id, trader_id });

        Ok(id)
    }

    /// Replace an active offer's price and quantity.
    ///
    /// Labels, trader, and the validity window are immutable post-creation.
    /// A zero quantity is allowed here (it makes the offer unbookable
    /// without removing it).
    pub fn edit_bid_ask(
        &mut self,
        caller: Address,
        id: u64,
        price: u64,
        quantity: u64,
    ) -> Result<(), ExchangeError> {
        self.access.require_live()?;
        self.access.require_unpaused()?;

        self.require_offer_owner(caller, id)?;
        self.bid_asks.update_terms(id, price, quantity);
        self.events.emit(Event::BidAskUpdated { id });

        Ok(())
    }

    /// Soft-delete an active offer.
    pub fn remove_bid_ask(&mut self, caller: Address, id: u64) -> Result<(), ExchangeError> {
        self.access.require_live()?;
        self.access.require_unpaused()?;

        self.require_offer_owner(caller, id)?;
        self.bid_asks.retire(id);
        self.events.emit(Event::BidAskRemoved { id });

        Ok(())
    }

    /// Resolve an offer and check the caller controls it.
    ///
    /// An offer whose owning trader has been removed resolves `NotFound`:
    /// there is no owner account left to authorize against.
    fn require_offer_owner(&self, caller: Address, id: u64) -> Result<(), ExchangeError> {
        let offer = self.bid_asks.get(id).ok_or(ExchangeError::NotFound)?;
        let trader = self
            .traders
            .get(offer.trader_id)
            .ok_or(ExchangeError::NotFound)?;
        if caller != trader.owner {
            return Err(ExchangeError::Unauthorized);
        }
        Ok(())
    }

    // ========================================================================
    // Purchase engine
    // ========================================================================

    /// Atomically book one or two offers.
    ///
    /// Preconditions, first failure wins: not paused; one or two legs; every
    /// leg resolves to an active, bookable offer with enough remaining
    /// quantity (a leg listed twice needs `quantity >= 2`); and
    /// `amount_paid` equals the exact sum of the leg prices (overpay and
    /// underpay both fail, no change is given).
    ///
    /// On success every leg is decremented by one, a purchase record is
    /// stored, and one `BidAskPurchased` event is emitted per leg carrying
    /// the shared purchase id. On failure nothing changes at all.
    pub fn book(
        &mut self,
        caller: Address,
        legs: &[u64],
        first_name: &str,
        last_name: &str,
        amount_paid: u64,
    ) -> Result<u64, ExchangeError> {
        self.access.require_live()?;
        self.access.require_unpaused()?;

        if legs.is_empty() || legs.len() > MAX_LEGS {
            return Err(ExchangeError::InvalidInput);
        }
        if !valid_customer_name(first_name) || !valid_customer_name(last_name) {
            return Err(ExchangeError::InvalidInput);
        }

        // Validate every leg before touching any of them.
        let mut total: u128 = 0;
        for &id in legs {
            let offer = self.bookable(id).ok_or(ExchangeError::NotFound)?;
            let needed = legs.iter().filter(|&&leg| leg == id).count() as u64;
            if offer.quantity < needed {
                return Err(ExchangeError::InsufficientQuantity);
            }
            total += u128::from(offer.price);
        }
        if total != u128::from(amount_paid) {
            return Err(ExchangeError::AmountMismatch);
        }

        // Commit: decrements cannot fail after the checks above.
        for &id in legs {
            self.bid_asks.take_unit(id);
        }
        let purchase_id =
            self.purchases
                .record(legs.to_vec(), caller, first_name, last_name, amount_paid);
        for &id in legs {
            self.events.emit(Event::BidAskPurchased {
                purchase_id,
                bid_ask_id: id,
                buyer: caller,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            });
        }

        Ok(purchase_id)
    }

    /// An active offer whose owning trader is also active.
    fn bookable(&self, id: u64) -> Option<&BidAsk> {
        let offer = self.bid_asks.get(id)?;
        self.traders.get(offer.trader_id)?;
        Some(offer)
    }

    // ========================================================================
    // Queries (read-only, available while paused)
    // ========================================================================

    /// The ledger owner account.
    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    /// Whether the circuit breaker is engaged.
    pub fn paused(&self) -> bool {
        self.access.paused()
    }

    /// Whether the ledger has been destroyed.
    pub fn destroyed(&self) -> bool {
        self.access.destroyed()
    }

    /// Number of active traders.
    pub fn trader_count(&self) -> usize {
        self.traders.len()
    }

    /// Get an active trader by id.
    pub fn trader(&self, id: u64) -> Option<&Trader> {
        self.traders.get(id)
    }

    /// Get an active trader by insertion-order index.
    pub fn trader_by_index(&self, index: usize) -> Option<&Trader> {
        self.traders.by_index(index)
    }

    /// Whether an active trader holds `name` (exact byte match).
    pub fn trader_exists(&self, name: &str) -> bool {
        self.traders.contains_name(name)
    }

    /// Number of active offers belonging to a trader.
    pub fn bid_ask_count(&self, trader_id: u64) -> usize {
        self.bid_asks.count_for(trader_id)
    }

    /// Get an offer by id, provided it is listed (active, active trader).
    pub fn bid_ask(&self, id: u64) -> Option<&BidAsk> {
        self.bookable(id)
    }

    /// Get a trader's offer by local insertion-order index.
    pub fn bid_ask_by_trader(&self, trader_id: u64, index: usize) -> Option<&BidAsk> {
        self.traders.get(trader_id)?;
        self.bid_asks.by_trader_index(trader_id, index)
    }

    /// Ids of listed offers trading exactly `from -> to`, ascending id,
    /// capped at [`crate::store::FIND_RESULTS_MAX`].
    pub fn find_direct(&self, from: &str, to: &str) -> Vec<u64> {
        self.bid_asks
            .find_direct(from, to, |trader_id| self.traders.get(trader_id).is_some())
    }

    /// Number of recorded purchases.
    pub fn purchase_count(&self) -> usize {
        self.purchases.len()
    }

    /// Get a purchase record by id.
    pub fn purchase(&self, id: u64) -> Option<&Purchase> {
        self.purchases.get(id)
    }

    // ========================================================================
    // Event access
    // ========================================================================

    /// Attach an event subscriber with the default channel capacity.
    pub fn subscribe(&mut self) -> EventSubscription {
        self.events.subscribe()
    }

    /// Attach an event subscriber with an explicit bounded capacity.
    pub fn subscribe_with_capacity(&mut self, capacity: usize) -> EventSubscription {
        self.events.subscribe_with_capacity(capacity)
    }

    /// Number of committed events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Retained events with `seq > after` (the replay path).
    pub fn events_since(&self, after: u64) -> &[SequencedEvent] {
        self.events.events_since(after)
    }

    // ========================================================================
    // Internal access for the snapshot layer
    // ========================================================================

    pub(crate) fn access(&self) -> &AccessControl {
        &self.access
    }

    pub(crate) fn traders_book(&self) -> &TraderBook {
        &self.traders
    }

    pub(crate) fn bid_asks_book(&self) -> &BidAskBook {
        &self.bid_asks
    }

    pub(crate) fn purchases_ledger(&self) -> &PurchaseLedger {
        &self.purchases
    }

    pub(crate) fn event_log(&self) -> &EventLog {
        &self.events
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PRICE: u64 = 50_000_000;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    /// Ledger with one trader (id 1, owner addr(2)) and one EUR->USD offer
    /// (id 1, price PRICE, quantity 5).
    fn seeded_exchange() -> Exchange {
        let mut exchange = Exchange::new(addr(1));
        exchange.add_trader(addr(1), "Nordic FX", addr(2), "").unwrap();
        exchange
            .add_bid_ask(addr(2), 1, "EUR", "USD", PRICE, 5, 0, 0)
            .unwrap();
        exchange
    }

    #[test]
    fn test_add_trader_happy_path() {
        let mut exchange = Exchange::new(addr(1));

        let id = exchange.add_trader(addr(1), "Nordic FX", addr(2), "").unwrap();
        assert_eq!(id, 1);
        assert_eq!(exchange.trader_count(), 1);
        assert!(exchange.trader_exists("Nordic FX"));

        let trader = exchange.trader(1).unwrap();
        assert_eq!(trader.owner, addr(2));
        assert_eq!(trader.logo, DEFAULT_LOGO); // empty logo defaults
    }

    #[test]
    fn test_add_trader_validation() {
        let mut exchange = Exchange::new(addr(1));

        assert_eq!(
            exchange.add_trader(addr(9), "Nordic FX", addr(2), ""),
            Err(ExchangeError::Unauthorized)
        );
        assert_eq!(
            exchange.add_trader(addr(1), "", addr(2), ""),
            Err(ExchangeError::InvalidInput)
        );
        assert_eq!(
            exchange.add_trader(addr(1), &"x".repeat(33), addr(2), ""),
            Err(ExchangeError::InvalidInput)
        );
        assert_eq!(
            exchange.add_trader(addr(1), "Nordic FX", Address::ZERO, ""),
            Err(ExchangeError::InvalidInput)
        );

        exchange.add_trader(addr(1), "Nordic FX", addr(2), "").unwrap();
        assert_eq!(
            exchange.add_trader(addr(1), "Nordic FX", addr(3), ""),
            Err(ExchangeError::DuplicateName)
        );
    }

    #[test]
    fn test_edit_trader_self_rename_skips_uniqueness() {
        let mut exchange = seeded_exchange();

        // Same name, new owner: must not trip DuplicateName on itself.
        exchange
            .edit_trader(addr(1), 1, "Nordic FX", addr(3), "logo-2")
            .unwrap();

        let trader = exchange.trader(1).unwrap();
        assert_eq!(trader.owner, addr(3));
        assert_eq!(trader.logo, "logo-2");
    }

    #[test]
    fn test_edit_trader_duplicate_name() {
        let mut exchange = seeded_exchange();
        exchange.add_trader(addr(1), "Second", addr(4), "").unwrap();

        assert_eq!(
            exchange.edit_trader(addr(1), 1, "Second", addr(2), ""),
            Err(ExchangeError::DuplicateName)
        );
        // Nothing changed
        assert_eq!(exchange.trader(1).unwrap().name, "Nordic FX");
    }

    #[test]
    fn test_edit_trader_not_found() {
        let mut exchange = Exchange::new(addr(1));
        assert_eq!(
            exchange.edit_trader(addr(1), 7, "Name", addr(2), ""),
            Err(ExchangeError::NotFound)
        );
    }

    #[test]
    fn test_remove_trader_frees_name_and_unlists_offers() {
        let mut exchange = seeded_exchange();

        exchange.remove_trader(addr(1), 1).unwrap();

        assert_eq!(exchange.trader_count(), 0);
        assert!(!exchange.trader_exists("Nordic FX"));
        assert!(exchange.trader(1).is_none());

        // The offer survives in storage but is unlisted and unbookable.
        assert!(exchange.bid_ask(1).is_none());
        assert!(exchange.find_direct("EUR", "USD").is_empty());
        assert_eq!(
            exchange.book(addr(5), &[1], "Ada", "Lovelace", PRICE),
            Err(ExchangeError::NotFound)
        );

        // The name can be reused, the id cannot.
        let id = exchange.add_trader(addr(1), "Nordic FX", addr(2), "").unwrap();
        assert_eq!(id, 2);
    }

    #[test]
    fn test_add_bid_ask_authorization() {
        let mut exchange = seeded_exchange();

        // Ledger owner is not the trader owner
        assert_eq!(
            exchange.add_bid_ask(addr(1), 1, "EUR", "USD", PRICE, 1, 0, 0),
            Err(ExchangeError::Unauthorized)
        );
        // Unknown trader
        assert_eq!(
            exchange.add_bid_ask(addr(2), 9, "EUR", "USD", PRICE, 1, 0, 0),
            Err(ExchangeError::NotFound)
        );
        // Bad inputs
        assert_eq!(
            exchange.add_bid_ask(addr(2), 1, "", "USD", PRICE, 1, 0, 0),
            Err(ExchangeError::InvalidInput)
        );
        assert_eq!(
            exchange.add_bid_ask(addr(2), 1, "EUR", "USD", PRICE, 0, 0, 0),
            Err(ExchangeError::InvalidInput)
        );
    }

    #[test]
    fn test_edit_bid_ask() {
        let mut exchange = seeded_exchange();

        exchange.edit_bid_ask(addr(2), 1, PRICE * 2, 9).unwrap();
        let offer = exchange.bid_ask(1).unwrap();
        assert_eq!(offer.price, PRICE * 2);
        assert_eq!(offer.quantity, 9);

        assert_eq!(
            exchange.edit_bid_ask(addr(3), 1, PRICE, 1),
            Err(ExchangeError::Unauthorized)
        );
        assert_eq!(
            exchange.edit_bid_ask(addr(2), 9, PRICE, 1),
            Err(ExchangeError::NotFound)
        );
    }

    #[test]
    fn test_remove_bid_ask() {
        let mut exchange = seeded_exchange();

        assert_eq!(
            exchange.remove_bid_ask(addr(3), 1),
            Err(ExchangeError::Unauthorized)
        );

        exchange.remove_bid_ask(addr(2), 1).unwrap();
        assert!(exchange.bid_ask(1).is_none());
        assert_eq!(exchange.bid_ask_count(1), 0);
        assert_eq!(
            exchange.remove_bid_ask(addr(2), 1),
            Err(ExchangeError::NotFound)
        );
    }

    #[test]
    fn test_book_single_leg() {
        let mut exchange = seeded_exchange();

        let purchase_id = exchange
            .book(addr(5), &[1], "Ada", "Lovelace", PRICE)
            .unwrap();

        assert_eq!(purchase_id, 1);
        assert_eq!(exchange.bid_ask(1).unwrap().quantity, 4);

        let purchase = exchange.purchase(1).unwrap();
        assert_eq!(purchase.bid_ask_ids, vec![1]);
        assert_eq!(purchase.buyer, addr(5));
        assert_eq!(purchase.amount_paid, PRICE);
    }

    #[test]
    fn test_book_two_legs_shares_purchase_id() {
        let mut exchange = seeded_exchange();
        exchange
            .add_bid_ask(addr(2), 1, "USD", "GBP", PRICE * 3, 5, 0, 0)
            .unwrap();

        let purchase_id = exchange
            .book(addr(5), &[1, 2], "Ada", "Lovelace", PRICE * 4)
            .unwrap();

        assert_eq!(exchange.bid_ask(1).unwrap().quantity, 4);
        assert_eq!(exchange.bid_ask(2).unwrap().quantity, 4);

        let legs: Vec<_> = exchange
            .events_since(0)
            .iter()
            .filter_map(|entry| match &entry.event {
                Event::BidAskPurchased {
                    purchase_id: pid,
                    bid_ask_id,
                    ..
                } => Some((*pid, *bid_ask_id)),
                _ => None,
            })
            .collect();
        assert_eq!(legs, vec![(purchase_id, 1), (purchase_id, 2)]);
    }

    #[test]
    fn test_book_amount_must_match_exactly() {
        let mut exchange = seeded_exchange();

        assert_eq!(
            exchange.book(addr(5), &[1], "Ada", "Lovelace", PRICE - 1),
            Err(ExchangeError::AmountMismatch)
        );
        assert_eq!(
            exchange.book(addr(5), &[1], "Ada", "Lovelace", PRICE + 1),
            Err(ExchangeError::AmountMismatch)
        );
        // No partial effects
        assert_eq!(exchange.bid_ask(1).unwrap().quantity, 5);
        assert_eq!(exchange.purchase_count(), 0);
    }

    #[test]
    fn test_book_failing_second_leg_rolls_back_nothing() {
        let mut exchange = seeded_exchange();
        exchange
            .add_bid_ask(addr(2), 1, "USD", "GBP", PRICE, 5, 0, 0)
            .unwrap();
        exchange.edit_bid_ask(addr(2), 2, PRICE, 0).unwrap(); // exhaust leg 2

        let events_before = exchange.event_count();
        assert_eq!(
            exchange.book(addr(5), &[1, 2], "Ada", "Lovelace", PRICE * 2),
            Err(ExchangeError::InsufficientQuantity)
        );

        // Leg 1 untouched, no purchase allocated, no event emitted.
        assert_eq!(exchange.bid_ask(1).unwrap().quantity, 5);
        assert_eq!(exchange.purchase_count(), 0);
        assert_eq!(exchange.event_count(), events_before);

        // The next successful booking still gets purchase id 1.
        let purchase_id = exchange
            .book(addr(5), &[1], "Ada", "Lovelace", PRICE)
            .unwrap();
        assert_eq!(purchase_id, 1);
    }

    #[test]
    fn test_book_duplicate_leg_needs_double_quantity() {
        let mut exchange = seeded_exchange();
        exchange.edit_bid_ask(addr(2), 1, PRICE, 1).unwrap();

        assert_eq!(
            exchange.book(addr(5), &[1, 1], "Ada", "Lovelace", PRICE * 2),
            Err(ExchangeError::InsufficientQuantity)
        );
        assert_eq!(exchange.bid_ask(1).unwrap().quantity, 1);

        exchange.edit_bid_ask(addr(2), 1, PRICE, 2).unwrap();
        exchange
            .book(addr(5), &[1, 1], "Ada", "Lovelace", PRICE * 2)
            .unwrap();
        assert_eq!(exchange.bid_ask(1).unwrap().quantity, 0);
    }

    #[test]
    fn test_book_leg_count_bounds() {
        let mut exchange = seeded_exchange();

        assert_eq!(
            exchange.book(addr(5), &[], "Ada", "Lovelace", 0),
            Err(ExchangeError::InvalidInput)
        );
        assert_eq!(
            exchange.book(addr(5), &[1, 1, 1], "Ada", "Lovelace", PRICE * 3),
            Err(ExchangeError::InvalidInput)
        );
    }

    #[test]
    fn test_pause_gates_every_mutation() {
        let mut exchange = seeded_exchange();
        exchange.pause(addr(1)).unwrap();

        assert_eq!(
            exchange.add_trader(addr(1), "Another", addr(2), ""),
            Err(ExchangeError::ContractPaused)
        );
        assert_eq!(
            exchange.edit_trader(addr(1), 1, "Renamed", addr(2), ""),
            Err(ExchangeError::ContractPaused)
        );
        assert_eq!(
            exchange.remove_trader(addr(1), 1),
            Err(ExchangeError::ContractPaused)
        );
        assert_eq!(
            exchange.add_bid_ask(addr(2), 1, "EUR", "USD", PRICE, 1, 0, 0),
            Err(ExchangeError::ContractPaused)
        );
        assert_eq!(
            exchange.edit_bid_ask(addr(2), 1, PRICE, 1),
            Err(ExchangeError::ContractPaused)
        );
        assert_eq!(
            exchange.remove_bid_ask(addr(2), 1),
            Err(ExchangeError::ContractPaused)
        );
        assert_eq!(
            exchange.book(addr(5), &[1], "Ada", "Lovelace", PRICE),
            Err(ExchangeError::ContractPaused)
        );

        // Pause shadows every other failure kind, even for bad requests.
        assert_eq!(
            exchange.add_trader(addr(9), "", Address::ZERO, ""),
            Err(ExchangeError::ContractPaused)
        );

        // Queries stay available.
        assert_eq!(exchange.trader_count(), 1);
        assert!(exchange.trader_exists("Nordic FX"));
        assert_eq!(exchange.find_direct("EUR", "USD"), vec![1]);

        // And everything works again after unpause.
        exchange.unpause(addr(1)).unwrap();
        exchange.add_trader(addr(1), "Another", addr(2), "").unwrap();
    }

    #[test]
    fn test_transfer_ownership_is_pause_exempt() {
        let mut exchange = seeded_exchange();
        exchange.pause(addr(1)).unwrap();

        exchange.transfer_ownership(addr(1), addr(7)).unwrap();
        assert_eq!(exchange.owner(), addr(7));

        // The new owner can unpause.
        exchange.unpause(addr(7)).unwrap();
    }

    #[test]
    fn test_destroy_is_terminal() {
        let mut exchange = seeded_exchange();

        // Requires the breaker engaged first.
        assert_eq!(exchange.destroy(addr(1)), Err(ExchangeError::InvalidState));

        exchange.pause(addr(1)).unwrap();
        exchange.destroy(addr(1)).unwrap();
        assert!(exchange.destroyed());

        // Commands fail uniformly; queries read an empty ledger.
        assert_eq!(
            exchange.add_trader(addr(1), "X", addr(2), ""),
            Err(ExchangeError::NotFound)
        );
        assert_eq!(
            exchange.book(addr(5), &[1], "A", "B", PRICE),
            Err(ExchangeError::NotFound)
        );
        assert_eq!(exchange.unpause(addr(1)), Err(ExchangeError::NotFound));
        assert_eq!(exchange.trader_count(), 0);
        assert!(exchange.trader(1).is_none());
        assert_eq!(exchange.purchase_count(), 0);
    }

    #[test]
    fn test_events_in_commit_order() {
        let mut exchange = Exchange::new(addr(1));
        let sub = exchange.subscribe();

        exchange.add_trader(addr(1), "Nordic FX", addr(2), "").unwrap();
        exchange
            .add_bid_ask(addr(2), 1, "EUR", "USD", PRICE, 5, 0, 0)
            .unwrap();
        exchange.book(addr(5), &[1], "Ada", "Lovelace", PRICE).unwrap();

        let delivered = sub.drain();
        assert_eq!(delivered.len(), 3);
        let seqs: Vec<u64> = delivered.iter().map(|entry| entry.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert!(matches!(delivered[0].event, Event::TraderAdded { id: 1, .. }));
        assert!(matches!(
            delivered[1].event,
            Event::BidAskAdded { id: 1, trader_id: 1 }
        ));
        assert!(matches!(
            delivered[2].event,
            Event::BidAskPurchased { purchase_id: 1, bid_ask_id: 1, .. }
        ));
    }

    #[test]
    fn test_failed_commands_emit_nothing() {
        let mut exchange = Exchange::new(addr(1));
        let sub = exchange.subscribe();

        let _ = exchange.add_trader(addr(9), "Nope", addr(2), "");
        let _ = exchange.add_trader(addr(1), "", addr(2), "");

        assert!(sub.try_next().is_none());
        assert_eq!(exchange.event_count(), 0);
    }

    #[test]
    fn test_bid_ask_by_trader_index() {
        let mut exchange = seeded_exchange();
        exchange
            .add_bid_ask(addr(2), 1, "USD", "GBP", PRICE, 5, 0, 0)
            .unwrap();

        assert_eq!(exchange.bid_ask_count(1), 2);
        assert_eq!(exchange.bid_ask_by_trader(1, 0).unwrap().id, 1);
        assert_eq!(exchange.bid_ask_by_trader(1, 1).unwrap().id, 2);
        assert!(exchange.bid_ask_by_trader(1, 2).is_none());
        assert!(exchange.bid_ask_by_trader(9, 0).is_none());
    }
}
