//! Domain events runtime bridge for the web server.
//!
//! Receives goal events via `DomainEventSink` and republishes them on the
//! `EventBus`, where the SSE endpoint picks them up.

mod sink;

pub use sink::WebDomainEventSink;
