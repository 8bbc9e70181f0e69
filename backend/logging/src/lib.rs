//! Structured logging for the bargaining engine.
//!
//! Sets up console and rolling NDJSON file output, and records negotiation
//! transitions as structured events.

pub mod event_logger;
pub mod logger;

pub use event_logger::{NegotiationEvent, NegotiationEventEntry, NegotiationEventLogger};
pub use logger::{EVENT_TARGET, init_console_logger, init_logger};
