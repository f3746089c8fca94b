//! Registry: pointer indirection to the current ledger backend.
//!
//! Clients resolve the authoritative ledger instance here once, then talk to
//! it directly; the registry is a discovery point, not a hop on the ledger's
//! hot path. Superseded backends are kept in an append-only history for
//! auditability.
//!
//! ## Example
//!
//! ```
//! use trader_exchange::{Address, Registry};
//!
//! let owner = Address::from_low_u64(1);
//! let v1 = Address::from_low_u64(100);
//! let v2 = Address::from_low_u64(200);
//!
//! let mut registry = Registry::new(owner, v1);
//! registry.change_backend(owner, v2).unwrap();
//!
//! assert_eq!(registry.backend(), v2);
//! assert_eq!(registry.history_at(0), Ok(v1));
//! ```

use crate::engine::access::AccessControl;
use crate::engine::events::{EventLog, EventSubscription};
use crate::error::ExchangeError;
use crate::types::{Address, Event, SequencedEvent};

/// One-slot backend pointer with an append-only history of past values.
#[derive(Debug, Clone)]
pub struct Registry {
    access: AccessControl,
    backend: Address,
    history: Vec<Address>,
    events: EventLog,
}

impl Registry {
    /// Create a registry pointing at `backend`, owned by `owner`.
    pub fn new(owner: Address, backend: Address) -> Self {
        Self {
            access: AccessControl::new(owner),
            backend,
            history: Vec::new(),
            events: EventLog::new(),
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Point the registry at a new backend.
    ///
    /// Owner-only. The current backend is appended to the history *before*
    /// being overwritten, so the history length always equals the number of
    /// successful changes.
    pub fn change_backend(
        &mut self,
        caller: Address,
        new_backend: Address,
    ) -> Result<(), ExchangeError> {
        self.access.require_owner(caller)?;

        let previous = self.backend;
        self.history.push(previous);
        self.backend = new_backend;
        self.events.emit(Event::BackendChanged {
            previous,
            new: new_backend,
        });

        Ok(())
    }

    /// Hand registry ownership to `new_owner`.
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

    // ========================================================================
    // Queries
    // ========================================================================

    /// The registry owner account.
    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    /// The currently authoritative backend.
    pub fn backend(&self) -> Address {
        self.backend
    }

    /// Number of superseded backends.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// A superseded backend by position (0 = oldest).
    pub fn history_at(&self, index: usize) -> Result<Address, ExchangeError> {
        self.history
            .get(index)
            .copied()
            .ok_or(ExchangeError::NotFound)
    }

    // ========================================================================
    // Event access
    // ========================================================================

    /// Attach an event subscriber.
    pub fn subscribe(&mut self) -> EventSubscription {
        self.events.subscribe()
    }

    /// Retained events with `seq > after`.
    pub fn events_since(&self, after: u64) -> &[SequencedEvent] {
        self.events.events_since(after)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
