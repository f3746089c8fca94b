//! Append-only event log with non-blocking subscriber fan-out.
//!
//! ## Delivery model
//!
//! The log is the source of truth: every committed mutation appends exactly
//! one [`SequencedEvent`] per affected entity, in commit order, gap-free.
//! Fan-out to subscribers is decoupled from the commit path:
//!
//! - each subscriber owns a bounded channel
//! - delivery uses `try_send`; a full channel loses that delivery instead of
//!   blocking the ledger
//! - a disconnected subscriber is pruned on the next emit
//!
//! A subscriber that missed deliveries (or reconnects) replays from the
//! retained log with [`EventLog::events_since`] and deduplicates by `seq`.
//!
//! ## Example
//!
//! ```
//! use trader_exchange::engine::EventLog;
//! use trader_exchange::types::Event;
//!
//! let mut log = EventLog::new();
//! let subscription = log.subscribe();
//!
//! log.emit(Event::Paused);
//!
//! let delivered = subscription.try_next().unwrap();
//! assert_eq!(delivered.seq, 1);
//! assert_eq!(delivered.event, Event::Paused);
//! ```

use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError, TrySendError};

use crate::types::{Event, SequencedEvent};

/// Default per-subscriber channel capacity.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 256;

/// Append-only sequenced event log with subscriber fan-out.
#[derive(Debug, Clone)]
pub struct EventLog {
    /// Retained log, in commit order. `events[i].seq == i + 1`.
    events: Vec<SequencedEvent>,

    /// Sequence number the next emit will receive.
    next_seq: u64,

    /// Live subscriber channels. Pruned lazily on emit.
    subscribers: Vec<SyncSender<SequencedEvent>>,
}

/// A subscriber's receiving end of the event stream.
///
/// Dropping the subscription detaches it; the log prunes the dead channel on
/// its next emit.
#[derive(Debug)]
pub struct EventSubscription {
    receiver: Receiver<SequencedEvent>,
}

impl EventSubscription {
    /// Take the next delivered event without blocking.
    ///
    /// Returns `None` when the queue is currently empty or the log is gone.
    pub fn try_next(&self) -> Option<SequencedEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<SequencedEvent> {
        let mut out = Vec::new();
        while let Some(event) = self.try_next() {
            out.push(event);
        }
        out
    }

    /// Block until the next event is delivered.
    ///
    /// Returns `None` once the log has been dropped and the queue drained.
    pub fn recv(&self) -> Option<SequencedEvent> {
        self.receiver.recv().ok()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    /// Create an empty log with no subscribers.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_seq: 1,
            subscribers: Vec::new(),
        }
    }

    // ========================================================================
    // Log access
    // ========================================================================

    /// Number of events committed so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been committed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The sequence number the next emit will receive.
    #[inline]
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Get a retained event by its 1-based sequence number.
    pub fn get(&self, seq: u64) -> Option<&SequencedEvent> {
        if seq == 0 {
            return None;
        }
        let offset = self.seq_offset();
        if seq <= offset {
            return None;
        }
        self.events.get((seq - offset - 1) as usize)
    }

    /// All retained events with `seq > after`, oldest first. The replay path
    /// for subscribers that missed deliveries.
    pub fn events_since(&self, after: u64) -> &[SequencedEvent] {
        let offset = self.seq_offset();
        let skip = after.saturating_sub(offset).min(self.events.len() as u64);
        &self.events[skip as usize..]
    }

    /// Sequence number of the event preceding the first retained one.
    fn seq_offset(&self) -> u64 {
        self.next_seq - self.events.len() as u64 - 1
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Attach a subscriber with the default channel capacity.
    pub fn subscribe(&mut self) -> EventSubscription {
        self.subscribe_with_capacity(DEFAULT_SUBSCRIBER_CAPACITY)
    }

    /// Attach a subscriber with an explicit bounded channel capacity.
    pub fn subscribe_with_capacity(&mut self, capacity: usize) -> EventSubscription {
        let (tx, rx) = sync_channel(capacity.max(1));
        self.subscribers.push(tx);
        EventSubscription { receiver: rx }
    }

    /// Number of attached subscriber channels (including any not yet pruned).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    // ========================================================================
    // Commit path
    // ========================================================================

    /// Append an event and fan it out, returning its sequence number.
    ///
    /// Never blocks: a subscriber whose channel is full loses this delivery
    /// (it can replay via [`EventLog::events_since`]); a disconnected
    /// subscriber is dropped.
    pub fn emit(&mut self, event: Event) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;

        let entry = SequencedEvent { seq, event };
        self.events.push(entry.clone());

        self.subscribers.retain(|tx| match tx.try_send(entry.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        });

        seq
    }

    /// Restore the sequence counter from a snapshot header. The retained
    /// event list is not part of snapshots; numbering simply continues.
    pub(crate) fn set_next_seq(&mut self, next_seq: u64) {
        self.next_seq = next_seq;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_assigns_gap_free_sequence() {
        let mut log = EventLog::new();

        assert_eq!(log.emit(Event::Paused), 1);
        assert_eq!(log.emit(Event::Unpaused), 2);
        assert_eq!(log.emit(Event::TraderRemoved { id: 1 }), 3);

        assert_eq!(log.len(), 3);
        assert_eq!(log.next_seq(), 4);
        assert_eq!(log.get(2).unwrap().event, Event::Unpaused);
        assert!(log.get(0).is_none());
        assert!(log.get(4).is_none());
    }

    #[test]
    fn test_events_since() {
        let mut log = EventLog::new();
        log.emit(Event::Paused);
        log.emit(Event::Unpaused);
        log.emit(Event::TraderRemoved { id: 1 });

        assert_eq!(log.events_since(0).len(), 3);
        let tail = log.events_since(2);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].seq, 3);
        assert!(log.events_since(3).is_empty());
        assert!(log.events_since(99).is_empty());
    }

    #[test]
    fn test_subscriber_receives_in_order() {
        let mut log = EventLog::new();
        let sub = log.subscribe();

        log.emit(Event::Paused);
        log.emit(Event::Unpaused);

        let delivered = sub.drain();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].seq, 1);
        assert_eq!(delivered[1].seq, 2);
    }

    #[test]
    fn test_full_subscriber_never_blocks_the_log() {
        let mut log = EventLog::new();
        let slow = log.subscribe_with_capacity(1);

        // Second emit overflows the capacity-1 channel; emit must not block
        // and the log itself must retain both events.
        log.emit(Event::Paused);
        log.emit(Event::Unpaused);

        assert_eq!(log.len(), 2);
        let delivered = slow.drain();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].seq, 1);

        // The missed event is recoverable by replay.
        let replayed = log.events_since(delivered[0].seq);
        assert_eq!(replayed.len(), 1);
        assert_eq!(replayed[0].seq, 2);
    }

    #[test]
    fn test_disconnected_subscriber_is_pruned() {
        let mut log = EventLog::new();
        let sub = log.subscribe();
        assert_eq!(log.subscriber_count(), 1);

        drop(sub);
        log.emit(Event::Paused);
        assert_eq!(log.subscriber_count(), 0);
    }

    #[test]
    fn test_multiple_subscribers_all_receive() {
        let mut log = EventLog::new();
        let a = log.subscribe();
        let b = log.subscribe();

        log.emit(Event::Paused);

        assert_eq!(a.try_next().unwrap().seq, 1);
        assert_eq!(b.try_next().unwrap().seq, 1);
    }
}
