//! Negotiation Event Logger
//!
//! Session transitions (start, offer, decision, end) emitted as structured
//! `tracing` events under the `negotiation_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::logger::EVENT_TARGET;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum NegotiationEvent {
    SessionStarted {
        policy: String,
        max_rounds: u32,
    },
    OfferDrawn {
        round: u32,
        proposer: Option<String>,
        share_a: f64,
        share_b: f64,
    },
    DecisionRecorded {
        round: u32,
        decision: String,
        counter_value: Option<f64>,
    },
    SessionEnded {
        outcome: String,
        rounds: u32,
        decisions: usize,
    },
}

impl NegotiationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NegotiationEvent::SessionStarted { .. } => "session_started",
            NegotiationEvent::OfferDrawn { .. } => "offer_drawn",
            NegotiationEvent::DecisionRecorded { .. } => "decision_recorded",
            NegotiationEvent::SessionEnded { .. } => "session_ended",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NegotiationEventEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: NegotiationEvent,
}

pub struct NegotiationEventLogger;

impl NegotiationEventLogger {
    pub fn entry(session_id: &str, event: NegotiationEvent) -> NegotiationEventEntry {
        NegotiationEventEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    /// Record a session transition.
    pub fn log_event(session_id: &str, event: NegotiationEvent) {
        let kind = event.kind();
        let entry = Self::entry(session_id, event);
        let payload = serde_json::to_string(&entry).unwrap_or_else(|_| format!("{entry:?}"));
        info!(
            target: EVENT_TARGET,
            session_id = %entry.session_id,
            kind,
            event = %payload,
            "Negotiation event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_serializes_with_type_tag() {
        let entry = NegotiationEventLogger::entry(
            "20250101120000",
            NegotiationEvent::DecisionRecorded {
                round: 2,
                decision: "counter".into(),
                counter_value: None,
            },
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["session_id"], "20250101120000");
        assert_eq!(json["event"]["type"], "DecisionRecorded");
        assert!(json["event"]["counter_value"].is_null());
    }

    #[test]
    fn kinds_are_snake_case() {
        let ev = NegotiationEvent::SessionEnded {
            outcome: "accepted".into(),
            rounds: 1,
            decisions: 1,
        };
        assert_eq!(ev.kind(), "session_ended");
    }
}
