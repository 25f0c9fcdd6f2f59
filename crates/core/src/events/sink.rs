//! Where services send their domain events.

use std::sync::{Arc, Mutex};

use super::DomainEvent;
use crate::ids::PeriodId;

/// Receives events after the mutation behind them has been persisted.
///
/// `emit` runs inside the service call that produced the event and must not
/// block. Nothing a sink does can roll the mutation back.
pub trait DomainEventSink: Send + Sync {
    fn emit(&self, event: DomainEvent);

    /// Emits in order; override when the host can deliver a batch at once.
    fn emit_batch(&self, events: Vec<DomainEvent>) {
        events.into_iter().for_each(|event| self.emit(event));
    }
}

/// Drops every event. Default sink of every service.
#[derive(Clone, Default)]
pub struct NoOpDomainEventSink;

impl DomainEventSink for NoOpDomainEventSink {
    fn emit(&self, _event: DomainEvent) {}
}

/// Records events in memory so tests can assert on them.
///
/// Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MockDomainEventSink {
    recorded: Arc<Mutex<Vec<DomainEvent>>>,
}

impl MockDomainEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.recorded.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Events that concern the given period, in emission order.
    pub fn events_for_period(&self, period_id: PeriodId) -> Vec<DomainEvent> {
        self.recorded
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.period_id() == period_id)
            .cloned()
            .collect()
    }
}

impl DomainEventSink for MockDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        self.recorded.lock().unwrap().push(event);
    }
}
