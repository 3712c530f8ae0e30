// crates/lockstake-economics/src/sink.rs
//
// In-memory notification consumers.

use std::sync::{Mutex, PoisonError};

use lockstake_core::{EventSink, StakingEvent};

/// An `EventSink` that records every event in order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<StakingEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all recorded events.
    pub fn snapshot(&self) -> Vec<StakingEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Remove and return all recorded events.
    pub fn drain(&self) -> Vec<StakingEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<StakingEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: StakingEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: StakingEvent) {}
}
