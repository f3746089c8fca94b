//! Purchase ledger: append-only storage for booking records.
//!
//! Purchases are the audit trail. Records are never mutated or deleted once
//! written; ids are strictly increasing and never reused.

use std::collections::HashMap;

use slab::Slab;

use crate::types::{Address, Purchase};

/// Append-only book of purchase records.
#[derive(Debug, Clone)]
pub struct PurchaseLedger {
    records: Slab<Purchase>,

    /// Purchase id to slab key.
    id_index: HashMap<u64, usize>,

    /// Next id to assign; never rewinds.
    next_id: u64,
}

impl Default for PurchaseLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PurchaseLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a ledger with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Slab::with_capacity(capacity),
            id_index: HashMap::with_capacity(capacity),
            next_id: 1,
        }
    }

    /// Number of recorded purchases.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no purchase has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a purchase by id.
    pub fn get(&self, id: u64) -> Option<&Purchase> {
        let key = *self.id_index.get(&id)?;
        self.records.get(key)
    }

    /// The id the next booking will receive (without assigning it).
    #[inline]
    pub fn peek_next_id(&self) -> u64 {
        self.next_id
    }

    /// Append a new purchase and return its id.
    pub fn record(
        &mut self,
        bid_ask_ids: Vec<u64>,
        buyer: Address,
        first_name: &str,
        last_name: &str,
        amount_paid: u64,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let key = self.records.insert(Purchase::new(
            id,
            bid_ask_ids,
            buyer,
            first_name,
            last_name,
            amount_paid,
        ));
        self.id_index.insert(id, key);

        id
    }

    /// Iterate over all purchases, ascending id. Used by the snapshot layer.
    pub fn iter_all(&self) -> impl Iterator<Item = &Purchase> {
        self.records.iter().map(|(_, record)| record)
    }

    /// Drop every record. The id counter never rewinds.
    pub fn clear(&mut self) {
        self.records.clear();
        self.id_index.clear();
    }

    /// Re-insert a purchase from a snapshot.
    pub(crate) fn restore_record(&mut self, record: Purchase) {
        let id = record.id;
        let key = self.records.insert(record);
        self.id_index.insert(id, key);
    }

    /// Restore the id counter from a snapshot header.
    pub(crate) fn set_next_id(&mut self, next_id: u64) {
        self.next_id = next_id;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
