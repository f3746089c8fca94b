//! BidAsk book: slab-backed storage for offers.
//!
//! ## Architecture
//!
//! - **Slab**: one slot per offer ever posted; soft-deleted offers keep
//!   their slot so the audit trail survives
//! - **HashMap id index**: O(1) lookup of *active* offers by id
//! - **Per-trader lists**: active offer ids per trader, insertion order
//!
//! Offer ids are globally sequential across all traders. Because slots are
//! never removed, slab iteration order equals id order, which is what the
//! `find_direct` tie-break (ascending id) relies on.

use std::collections::HashMap;

use slab::Slab;

use crate::types::BidAsk;

/// Maximum number of results returned by [`BidAskBook::find_direct`].
///
/// The original interface returned a fixed 20-slot buffer terminated by a
/// zero id; a bounded `Vec` carries the same information.
pub const FIND_RESULTS_MAX: usize = 20;

/// Slab-backed book of offers.
#[derive(Debug, Clone)]
pub struct BidAskBook {
    /// All offers ever posted, including retired ones.
    records: Slab<BidAsk>,

    /// Offer id to slab key, active offers only.
    id_index: HashMap<u64, usize>,

    /// Active offer ids per trader, insertion order.
    by_trader: HashMap<u64, Vec<u64>>,

    /// Next id to assign; never rewinds.
    next_id: u64,
}

impl Default for BidAskBook {
    fn default() -> Self {
        Self::new()
    }
}

impl BidAskBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a book with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Slab::with_capacity(capacity),
            id_index: HashMap::with_capacity(capacity),
            by_trader: HashMap::new(),
            next_id: 1,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of active offers across all traders.
    #[inline]
    pub fn len(&self) -> usize {
        self.id_index.len()
    }

    /// Whether the book has no active offers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.id_index.is_empty()
    }

    /// Get an active offer by id.
    pub fn get(&self, id: u64) -> Option<&BidAsk> {
        let key = *self.id_index.get(&id)?;
        self.records.get(key)
    }

    /// Number of active offers belonging to a trader.
    pub fn count_for(&self, trader_id: u64) -> usize {
        self.by_trader.get(&trader_id).map_or(0, Vec::len)
    }

    /// Get a trader's active offer by local insertion-order index.
    pub fn by_trader_index(&self, trader_id: u64, index: usize) -> Option<&BidAsk> {
        let id = *self.by_trader.get(&trader_id)?.get(index)?;
        self.get(id)
    }

    /// The id the next insertion will receive (without assigning it).
    #[inline]
    pub fn peek_next_id(&self) -> u64 {
        self.next_id
    }

    /// Find active offers whose labels exactly match the pair, ascending id,
    /// capped at [`FIND_RESULTS_MAX`].
    ///
    /// `is_trader_active` lets the caller exclude offers whose owning trader
    /// has been removed: those stay in storage but must never be listed.
    pub fn find_direct(
        &self,
        from: &str,
        to: &str,
        is_trader_active: impl Fn(u64) -> bool,
    ) -> Vec<u64> {
        let mut results = Vec::new();
        for (_, offer) in self.records.iter() {
            if !offer.active || !offer.matches_pair(from, to) {
                continue;
            }
            if !is_trader_active(offer.trader_id) {
                continue;
            }
            results.push(offer.id);
            if results.len() == FIND_RESULTS_MAX {
                break;
            }
        }
        results
    }

    /// Iterate over every offer ever posted, retired included, ascending id.
    /// Used by the snapshot layer.
    pub fn iter_all(&self) -> impl Iterator<Item = &BidAsk> {
        self.records.iter().map(|(_, record)| record)
    }

    // ========================================================================
    // Mutations (validation happens in the engine layer)
    // ========================================================================

    /// Insert a new active offer and return its id.
    #[allow(clippy::too_many_arguments)]
    pub fn insert(
        &mut self,
        trader_id: u64,
        from: &str,
        to: &str,
        price: u64,
        quantity: u64,
        origin_time: u64,
        destination_time: u64,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let key = self.records.insert(BidAsk::new(
            id,
            trader_id,
            from,
            to,
            price,
            quantity,
            origin_time,
            destination_time,
        ));
        self.id_index.insert(id, key);
        self.by_trader.entry(trader_id).or_default().push(id);

        id
    }

    /// Replace the mutable terms (price, quantity) of an active offer.
    ///
    /// Returns false if the id is not active. Labels, trader, and the
    /// validity window are immutable post-creation.
    pub fn update_terms(&mut self, id: u64, price: u64, quantity: u64) -> bool {
        let Some(&key) = self.id_index.get(&id) else {
            return false;
        };
        let Some(record) = self.records.get_mut(key) else {
            return false;
        };
        record.price = price;
        record.quantity = quantity;
        true
    }

    /// Consume one unit of an active offer for a booking leg.
    ///
    /// Returns false if the id is not active or no quantity remains.
    pub fn take_unit(&mut self, id: u64) -> bool {
        let Some(&key) = self.id_index.get(&id) else {
            return false;
        };
        match self.records.get_mut(key) {
            Some(record) => record.fill_one(),
            None => false,
        }
    }

    /// Soft-delete an active offer. Returns false if the id is not active.
    pub fn retire(&mut self, id: u64) -> bool {
        let Some(key) = self.id_index.remove(&id) else {
            return false;
        };

        if let Some(record) = self.records.get_mut(key) {
            record.retire();
            if let Some(ids) = self.by_trader.get_mut(&record.trader_id) {
                ids.retain(|&active| active != id);
            }
        }

        true
    }

    /// Drop every record and index. The id counter never rewinds.
    pub fn clear(&mut self) {
        self.records.clear();
        self.id_index.clear();
        self.by_trader.clear();
    }

    // ========================================================================
    // Snapshot restore
    // ========================================================================

    /// Re-insert an offer from a snapshot, rebuilding the indexes.
    pub(crate) fn restore_record(&mut self, record: BidAsk) {
        let id = record.id;
        let trader_id = record.trader_id;
        let active = record.active;

        let key = self.records.insert(record);
        if active {
            self.id_index.insert(id, key);
            self.by_trader.entry(trader_id).or_default().push(id);
        }
    }

    /// Restore the id counter from a snapshot header.
    pub(crate) fn set_next_id(&mut self, next_id: u64) {
        self.next_id = next_id;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn post(book: &mut BidAskBook, trader_id: u64, from: &str, to: &str, qty: u64) -> u64 {
        book.insert(trader_id, from, to, 50_000_000, qty, 0, 0)
    }

    #[test]
    fn test_insert_assigns_global_sequential_ids() {
        let mut book = BidAskBook::new();

        assert_eq!(post(&mut book, 1, "EUR", "USD", 5), 1);
        assert_eq!(post(&mut book, 2, "GBP", "JPY", 5), 2);
        assert_eq!(post(&mut book, 1, "EUR", "CHF", 5), 3);
        assert_eq!(book.peek_next_id(), 4);
    }

    #[test]
    fn test_per_trader_counts_and_index() {
        let mut book = BidAskBook::new();
        post(&mut book, 1, "EUR", "USD", 5);
        post(&mut book, 2, "GBP", "JPY", 5);
        post(&mut book, 1, "EUR", "CHF", 5);

        assert_eq!(book.count_for(1), 2);
        assert_eq!(book.count_for(2), 1);
        assert_eq!(book.count_for(3), 0);

        assert_eq!(book.by_trader_index(1, 0).unwrap().id, 1);
        assert_eq!(book.by_trader_index(1, 1).unwrap().id, 3);
        assert!(book.by_trader_index(1, 2).is_none());
    }

    #[test]
    fn test_update_terms_only_touches_price_and_quantity() {
        let mut book = BidAskBook::new();
        let id = post(&mut book, 1, "EUR", "USD", 5);

        assert!(book.update_terms(id, 75_000_000, 9));

        let offer = book.get(id).unwrap();
        assert_eq!(offer.price, 75_000_000);
        assert_eq!(offer.quantity, 9);
        assert_eq!(offer.from, "EUR");
        assert_eq!(offer.trader_id, 1);
    }

    #[test]
    fn test_take_unit() {
        let mut book = BidAskBook::new();
        let id = post(&mut book, 1, "EUR", "USD", 1);

        assert!(book.take_unit(id));
        assert_eq!(book.get(id).unwrap().quantity, 0);
        assert!(!book.take_unit(id)); // exhausted
        assert!(!book.take_unit(99)); // unknown
    }

    #[test]
    fn test_retire_removes_from_indexes() {
        let mut book = BidAskBook::new();
        let a = post(&mut book, 1, "EUR", "USD", 5);
        let b = post(&mut book, 1, "EUR", "CHF", 5);

        assert!(book.retire(a));
        assert!(!book.retire(a)); // already retired

        assert!(book.get(a).is_none());
        assert_eq!(book.count_for(1), 1);
        assert_eq!(book.by_trader_index(1, 0).unwrap().id, b);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_find_direct_exact_match_ascending() {
        let mut book = BidAskBook::new();
        post(&mut book, 1, "EUR", "USD", 5); // 1
        post(&mut book, 2, "EUR", "USD", 5); // 2
        post(&mut book, 1, "USD", "EUR", 5); // 3: wrong direction
        post(&mut book, 1, "eur", "USD", 5); // 4: wrong case
        post(&mut book, 3, "EUR", "USD", 5); // 5

        let found = book.find_direct("EUR", "USD", |_| true);
        assert_eq!(found, vec![1, 2, 5]);
    }

    #[test]
    fn test_find_direct_skips_inactive_traders_and_retired_offers() {
        let mut book = BidAskBook::new();
        let a = post(&mut book, 1, "EUR", "USD", 5);
        post(&mut book, 2, "EUR", "USD", 5);

        book.retire(a);

        let found = book.find_direct("EUR", "USD", |trader_id| trader_id != 2);
        assert!(found.is_empty());

        let found = book.find_direct("EUR", "USD", |_| true);
        assert_eq!(found, vec![2]);
    }

    #[test]
    fn test_find_direct_is_bounded() {
        let mut book = BidAskBook::new();
        for _ in 0..(FIND_RESULTS_MAX + 10) {
            post(&mut book, 1, "EUR", "USD", 5);
        }

        let found = book.find_direct("EUR", "USD", |_| true);
        assert_eq!(found.len(), FIND_RESULTS_MAX);
        assert_eq!(found[0], 1);
        assert_eq!(found[FIND_RESULTS_MAX - 1], FIND_RESULTS_MAX as u64);
    }

    #[test]
    fn test_restore_record_rebuilds_indexes() {
        let mut book = BidAskBook::new();
        let mut retired = BidAsk::new(1, 7, "EUR", "USD", 1, 1, 0, 0);
        retired.retire();
        book.restore_record(retired);
        book.restore_record(BidAsk::new(2, 7, "EUR", "USD", 1, 4, 0, 0));
        book.set_next_id(3);

        assert_eq!(book.len(), 1);
        assert!(book.get(1).is_none());
        assert_eq!(book.count_for(7), 1);
        assert_eq!(book.insert(7, "GBP", "JPY", 1, 1, 0, 0), 3);
    }
}
