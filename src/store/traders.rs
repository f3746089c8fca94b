//! Trader book: slab-backed storage for exchange listings.
//!
//! ## Architecture
//!
//! - **Slab**: pre-allocated record storage, one slot per trader ever
//!   created (soft-deleted records keep their slot as tombstones)
//! - **HashMap id index**: O(1) lookup of *active* traders by id
//! - **HashMap name index**: O(1) uniqueness checks and `trader_exists`
//! - **Vec of active ids**: insertion-order index queries
//!
//! Ids are assigned sequentially starting at 1 and are never reused, even
//! after removal. Removal clears the record and frees the name.

use std::collections::HashMap;

use slab::Slab;

use crate::types::{Address, Trader};

/// Slab-backed book of trader records.
#[derive(Debug, Clone)]
pub struct TraderBook {
    /// All records ever created, including retired tombstones.
    records: Slab<Trader>,

    /// Trader id to slab key, active traders only.
    id_index: HashMap<u64, usize>,

    /// Active trader name to trader id (uniqueness index).
    name_index: HashMap<String, u64>,

    /// Active trader ids in insertion order (for index queries).
    active_ids: Vec<u64>,

    /// Next id to assign; never rewinds.
    next_id: u64,
}

impl Default for TraderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl TraderBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a book with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Slab::with_capacity(capacity),
            id_index: HashMap::with_capacity(capacity),
            name_index: HashMap::with_capacity(capacity),
            active_ids: Vec::with_capacity(capacity),
            next_id: 1,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of active traders.
    #[inline]
    pub fn len(&self) -> usize {
        self.active_ids.len()
    }

    /// Whether the book has no active traders.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active_ids.is_empty()
    }

    /// Get an active trader by id.
    pub fn get(&self, id: u64) -> Option<&Trader> {
        let key = *self.id_index.get(&id)?;
        self.records.get(key)
    }

    /// Get an active trader by insertion-order index.
    pub fn by_index(&self, index: usize) -> Option<&Trader> {
        let id = *self.active_ids.get(index)?;
        self.get(id)
    }

    /// Whether an active trader holds `name` (exact byte match).
    pub fn contains_name(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// Id of the active trader holding `name`, if any.
    pub fn id_by_name(&self, name: &str) -> Option<u64> {
        self.name_index.get(name).copied()
    }

    /// The id the next insertion will receive (without assigning it).
    #[inline]
    pub fn peek_next_id(&self) -> u64 {
        self.next_id
    }

    /// Iterate over every record ever created, tombstones included,
    /// ascending id. Used by the snapshot layer.
    pub fn iter_all(&self) -> impl Iterator<Item = &Trader> {
        self.records.iter().map(|(_, record)| record)
    }

    // ========================================================================
    // Mutations (validation happens in the engine layer)
    // ========================================================================

    /// Insert a new active trader and return its id.
    ///
    /// The caller has already validated the fields and checked name
    /// uniqueness.
    pub fn insert(&mut self, name: &str, owner: Address, logo: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let key = self.records.insert(Trader::new(id, name, owner, logo));
        self.id_index.insert(id, key);
        self.name_index.insert(name.to_string(), id);
        self.active_ids.push(id);

        id
    }

    /// Apply an edit to an active trader, keeping the name index in sync.
    ///
    /// Returns false (and changes nothing) if the id is not active.
    pub fn update(&mut self, id: u64, name: &str, owner: Address, logo: &str) -> bool {
        let Some(&key) = self.id_index.get(&id) else {
            return false;
        };
        // Slab key comes from our own index; the record must be present.
        let Some(record) = self.records.get_mut(key) else {
            return false;
        };

        if record.name != name {
            self.name_index.remove(&record.name);
            self.name_index.insert(name.to_string(), id);
            record.name = name.to_string();
        }
        record.owner = owner;
        record.logo = logo.to_string();

        true
    }

    /// Soft-delete an active trader: clear the record, free the name, retire
    /// the id. Returns false if the id is not active.
    pub fn retire(&mut self, id: u64) -> bool {
        let Some(key) = self.id_index.remove(&id) else {
            return false;
        };

        if let Some(record) = self.records.get_mut(key) {
            self.name_index.remove(&record.name);
            record.retire();
        }
        self.active_ids.retain(|&active| active != id);

        true
    }

    /// Drop every record and index. The id counter is left alone: ids never
    /// rewind, even through the terminal destroy transition.
    pub fn clear(&mut self) {
        self.records.clear();
        self.id_index.clear();
        self.name_index.clear();
        self.active_ids.clear();
    }

    // ========================================================================
    // Snapshot restore
    // ========================================================================

    /// Re-insert a record from a snapshot, rebuilding the indexes.
    pub(crate) fn restore_record(&mut self, record: Trader) {
        let id = record.id;
        let active = record.active;
        let name = record.name.clone();

        let key = self.records.insert(record);
        if active {
            self.id_index.insert(id, key);
            self.name_index.insert(name, id);
            self.active_ids.push(id);
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
