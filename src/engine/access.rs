//! Access control: owner identity, circuit breaker, terminal destroy state.
//!
//! Held by the exchange (and the registry) as an explicit value rather than
//! ambient global state, so unit tests can run isolated instances with
//! distinct owners.
//!
//! ## Gate ordering
//!
//! Every mutating command runs the gates in a fixed order: destroyed state
//! first (`NotFound`), then the circuit breaker (`ContractPaused`), then
//! ownership (`Unauthorized`). Pause shadows every later failure kind so
//! operators get a single unambiguous reason while stopped.

use crate::error::ExchangeError;
use crate::types::Address;

/// Owner, pause, and destroy state shared by ledger and registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControl {
    owner: Address,
    paused: bool,
    destroyed: bool,
}

impl AccessControl {
    /// Create access state owned by `owner`, unpaused.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            paused: false,
            destroyed: false,
        }
    }

    /// Rebuild access state from a snapshot header.
    pub(crate) fn from_flags(owner: Address, paused: bool, destroyed: bool) -> Self {
        Self {
            owner,
            paused,
            destroyed,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The current owner account.
    #[inline]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Whether the circuit breaker is engaged.
    #[inline]
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Whether the terminal destroy transition has been applied.
    #[inline]
    pub fn destroyed(&self) -> bool {
        self.destroyed
    }

    // ========================================================================
    // Gates
    // ========================================================================

    /// Fail with `NotFound` once the instance has been destroyed.
    pub fn require_live(&self) -> Result<(), ExchangeError> {
        if self.destroyed {
            return Err(ExchangeError::NotFound);
        }
        Ok(())
    }

    /// Fail with `ContractPaused` while the circuit breaker is engaged.
    pub fn require_unpaused(&self) -> Result<(), ExchangeError> {
        if self.paused {
            return Err(ExchangeError::ContractPaused);
        }
        Ok(())
    }

    /// Fail with `Unauthorized` unless `caller` is the owner.
    pub fn require_owner(&self, caller: Address) -> Result<(), ExchangeError> {
        if caller != self.owner {
            return Err(ExchangeError::Unauthorized);
        }
        Ok(())
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Hand ownership to `new_owner`, returning the previous owner.
    ///
    /// Owner-only; the zero address is not a well-formed owner. Deliberately
    /// exempt from the pause gate: this is the emergency-recovery path.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<Address, ExchangeError> {
        self.require_live()?;
        self.require_owner(caller)?;
        if new_owner.is_zero() {
            return Err(ExchangeError::InvalidInput);
        }

        let previous = self.owner;
        self.owner = new_owner;
        Ok(previous)
    }

    /// Engage the circuit breaker. Owner-only; fails `InvalidState` if
    /// already engaged.
    pub fn pause(&mut self, caller: Address) -> Result<(), ExchangeError> {
        self.require_live()?;
        self.require_owner(caller)?;
        if self.paused {
            return Err(ExchangeError::InvalidState);
        }

        self.paused = true;
        Ok(())
    }

    /// Release the circuit breaker. Owner-only; fails `InvalidState` if not
    /// engaged.
    pub fn unpause(&mut self, caller: Address) -> Result<(), ExchangeError> {
        self.require_live()?;
        self.require_owner(caller)?;
        if !self.paused {
            return Err(ExchangeError::InvalidState);
        }

        self.paused = false;
        Ok(())
    }

    /// Apply the irreversible destroy transition.
    ///
    /// Owner-only, and the circuit breaker must already be engaged: an
    /// operator stops the world before tearing it down. Afterwards every
    /// command fails `NotFound` via [`AccessControl::require_live`].
    pub fn destroy(&mut self, caller: Address) -> Result<(), ExchangeError> {
        self.require_live()?;
        self.require_owner(caller)?;
        if !self.paused {
            return Err(ExchangeError::InvalidState);
        }

        self.destroyed = true;
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
