//! Event sinks.

use crate::events::IntegrationEvent;
use crate::ports::outbound::EventSink;
use parking_lot::Mutex;
use tracing::info;

/// Keeps every published event in memory.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: Mutex<Vec<IntegrationEvent>>,
}

impl InMemoryEventLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events published so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<IntegrationEvent> {
        self.events.lock().clone()
    }

    /// Number of events published.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// True if nothing was published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Forget all events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for InMemoryEventLog {
    fn publish(&self, event: IntegrationEvent) {
        self.events.lock().push(event);
    }
}

/// Writes events to the log and drops them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: IntegrationEvent) {
        info!(event = event.name(), fund = ?event.fund(), "Integration event");
    }
}
