use novanest_core::events::{DomainEvent, DomainEventSink};

use crate::events::{EventBus, ServerEvent};

/// Forwards every domain event to connected SSE clients.
#[derive(Clone)]
pub struct WebDomainEventSink {
    event_bus: EventBus,
}

impl WebDomainEventSink {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }
}

impl DomainEventSink for WebDomainEventSink {
    fn emit(&self, event: DomainEvent) {
        match serde_json::to_value(&event) {
            Ok(payload) => self.event_bus.publish(ServerEvent::scoped(
                event.name(),
                event.scope().clone(),
                payload,
            )),
            Err(err) => {
                tracing::warn!("Dropping domain event {}: {}", event.name(), err);
            }
        }
    }
}
