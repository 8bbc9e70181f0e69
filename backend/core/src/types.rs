use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A two-way split of the pot. `share_a + share_b == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub share_a: f64,
    pub share_b: f64,
}

impl Offer {
    /// Build an offer from party A's share, clamped to `[0, 1]`.
    pub fn from_share_a(share_a: f64) -> Self {
        let share_a = share_a.clamp(0.0, 1.0);
        Self {
            share_a,
            share_b: 1.0 - share_a,
        }
    }
}

/// The party whose interest skews the current round's offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Proposer {
    A,
    B,
}

impl Proposer {
    /// Odd rounds belong to A, even rounds to B.
    pub fn for_round(round: u32) -> Self {
        if round % 2 == 1 {
            Proposer::A
        } else {
            Proposer::B
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Proposer::A => "A",
            Proposer::B => "B",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Proposer::A),
            "B" => Some(Proposer::B),
            _ => None,
        }
    }
}

impl fmt::Display for Proposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the responding party did with an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
    Counter,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Reject => "reject",
            Decision::Counter => "counter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accept" => Some(Decision::Accept),
            "reject" => Some(Decision::Reject),
            "counter" => Some(Decision::Counter),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Accepted,
    /// No agreement by the final round.
    Rejected,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::InProgress => write!(f, "In progress"),
            SessionStatus::Accepted => write!(f, "Accepted"),
            SessionStatus::Rejected => write!(f, "Rejected (no agreement)"),
        }
    }
}

/// One decision in the transcript. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub session_id: String,
    pub round: u32,
    pub proposer: Option<Proposer>,
    pub offer_a: f64,
    pub offer_b: f64,
    pub decision: Decision,
    #[serde(rename = "counterA")]
    pub counter_value: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Read-only snapshot handed to whatever renders the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub round: u32,
    pub max_rounds: u32,
    pub proposer: Option<Proposer>,
    pub offer: Option<Offer>,
    pub status: SessionStatus,
    pub history: Vec<HistoryEntry>,
}
