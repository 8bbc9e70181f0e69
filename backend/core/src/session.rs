//! Negotiation session: round progression, termination, and the decision log.
//!
//! A session is `InProgress` from `start()` until either party accepts or the
//! final round is turned down. Decisions on a finished session are ignored
//! and leave history and round untouched.

use std::fmt;

use bargain_logging::{NegotiationEvent, NegotiationEventLogger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BargainError, Result};
use crate::offer::{Concentration, OfferGenerator, OfferPolicy};
use crate::rng::{source_for, UniformSource};
use crate::sampler::{RandomSampler, DEFAULT_MAX_ITERATIONS};
use crate::types::{Decision, HistoryEntry, Offer, Proposer, SessionStatus, SessionView};

/// Default number of rounds before the session ends without agreement.
pub const MAX_ROUNDS: u32 = 5;

/// Everything fixed at session construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub max_rounds: u32,
    pub policy: OfferPolicy,
    pub concentration: Concentration,
    pub max_sampler_iterations: u32,
}

impl SessionConfig {
    /// Policy with its own default concentration schedule.
    pub fn for_policy(policy: OfferPolicy) -> Self {
        Self {
            max_rounds: MAX_ROUNDS,
            policy,
            concentration: policy.default_concentration(),
            max_sampler_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn fixed_skew() -> Self {
        Self::for_policy(OfferPolicy::fixed_skew())
    }

    pub fn alternating() -> Self {
        Self::for_policy(OfferPolicy::alternating())
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self.policy {
            OfferPolicy::FixedSkew { mean_a } if !(mean_a > 0.0 && mean_a < 1.0) => {
                return Err(BargainError::InvalidConfig(format!(
                    "mean_a must be in (0, 1), got {mean_a}"
                )));
            }
            OfferPolicy::AlternatingProposer { bias } if !(0.0..0.5).contains(&bias) => {
                return Err(BargainError::InvalidConfig(format!(
                    "bias must be in [0, 0.5), got {bias}"
                )));
            }
            _ => {}
        }
        if !(self.concentration.base > 0.0) || !(self.concentration.per_round > 0.0) {
            return Err(BargainError::InvalidConfig(
                "concentration base and per-round growth must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::fixed_skew()
    }
}

/// `yyyyMMddHHmmss` in UTC.
pub fn session_id_at(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%d%H%M%S").to_string()
}

pub fn new_session_id() -> String {
    session_id_at(Utc::now())
}

pub struct NegotiationSession {
    session_id: String,
    round: u32,
    started: bool,
    accepted: bool,
    finished: bool,
    current_proposer: Option<Proposer>,
    current_offer: Option<Offer>,
    history: Vec<HistoryEntry>,
    config: SessionConfig,
    generator: OfferGenerator,
    source: Box<dyn UniformSource>,
}

impl fmt::Debug for NegotiationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NegotiationSession")
            .field("session_id", &self.session_id)
            .field("round", &self.round)
            .field("status", &self.status())
            .field("current_offer", &self.current_offer)
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl NegotiationSession {
    /// A session drawing from the thread-local generator.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_source(config, source_for(None))
    }

    pub fn with_seed(config: SessionConfig, seed: u64) -> Self {
        Self::with_source(config, source_for(Some(seed)))
    }

    pub fn with_source(config: SessionConfig, source: Box<dyn UniformSource>) -> Self {
        let generator = OfferGenerator::new(
            config.policy,
            config.concentration,
            RandomSampler::new(config.max_sampler_iterations),
        );
        Self {
            session_id: new_session_id(),
            round: 0,
            started: false,
            accepted: false,
            finished: false,
            current_proposer: None,
            current_offer: None,
            history: Vec::new(),
            config,
            generator,
            source,
        }
    }

    // -- read side ---------------------------------------------------------

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.config.max_rounds
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_proposer(&self) -> Option<Proposer> {
        self.current_proposer
    }

    pub fn current_offer(&self) -> Option<Offer> {
        self.current_offer
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn status(&self) -> SessionStatus {
        if self.accepted {
            SessionStatus::Accepted
        } else if self.finished {
            SessionStatus::Rejected
        } else {
            SessionStatus::InProgress
        }
    }

    /// True while an offer is on the table and a decision can be taken.
    pub fn is_open(&self) -> bool {
        self.started && !self.accepted && !self.finished && self.current_offer.is_some()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.session_id.clone(),
            round: self.round,
            max_rounds: self.config.max_rounds,
            proposer: self.current_proposer,
            offer: self.current_offer,
            status: self.status(),
            history: self.history.clone(),
        }
    }

    // -- transitions -------------------------------------------------------

    /// Open round 1. Returns `Ok(false)` if the session was already started.
    pub fn start(&mut self) -> Result<bool> {
        if self.started {
            return Ok(false);
        }
        let next = self.draw_next()?;
        NegotiationEventLogger::log_event(
            &self.session_id,
            NegotiationEvent::SessionStarted {
                policy: policy_name(&self.config.policy).to_string(),
                max_rounds: self.config.max_rounds,
            },
        );

        match next {
            Some((round, proposer, offer)) => self.open_round(round, proposer, offer),
            None => self.finish(),
        }
        self.started = true;
        info!(session_id = %self.session_id, status = ?self.status(), "Session started");
        Ok(true)
    }

    pub fn accept(&mut self) -> Result<bool> {
        if !self.is_open() {
            debug!(session_id = %self.session_id, "Ignoring accept on closed session");
            return Ok(false);
        }
        self.record(Decision::Accept, None);
        self.accepted = true;
        self.log_end();
        Ok(true)
    }

    pub fn reject(&mut self) -> Result<bool> {
        self.decline(Decision::Reject, None)
    }

    /// Record a counter-offer for party A's share, then move on like a rejection.
    ///
    /// Non-finite values are logged as `None`; finite values are clamped to `[0, 1]`.
    /// The value is kept for the transcript only and does not shape later offers.
    /// Sessions with a fixed-skew policy have no counter move.
    pub fn counter(&mut self, value: f64) -> Result<bool> {
        if !self.config.policy.supports_counter() {
            debug!(session_id = %self.session_id, "Counter-offers are not part of this policy");
            return Ok(false);
        }
        let counter = value.is_finite().then(|| value.clamp(0.0, 1.0));
        self.decline(Decision::Counter, counter)
    }

    /// Counter from raw text input; anything that does not parse is recorded as `None`.
    pub fn counter_input(&mut self, raw: &str) -> Result<bool> {
        let value = raw.trim().parse::<f64>().unwrap_or(f64::NAN);
        self.counter(value)
    }

    /// Throw the session away and start a fresh one with a new id.
    pub fn reset(&mut self) -> Result<bool> {
        self.session_id = new_session_id();
        self.round = 0;
        self.started = false;
        self.accepted = false;
        self.finished = false;
        self.current_proposer = None;
        self.current_offer = None;
        self.history.clear();
        self.start()
    }

    // -- internals ---------------------------------------------------------

    fn decline(&mut self, decision: Decision, counter: Option<f64>) -> Result<bool> {
        if !self.is_open() {
            debug!(session_id = %self.session_id, %decision, "Ignoring decision on closed session");
            return Ok(false);
        }
        // Draw first so a sampler failure leaves the session untouched.
        let next = self.draw_next()?;
        self.record(decision, counter);
        match next {
            Some((round, proposer, offer)) => self.open_round(round, proposer, offer),
            None => self.finish(),
        }
        Ok(true)
    }

    /// The next round's proposer and offer, or `None` once the final round is done.
    fn draw_next(&mut self) -> Result<Option<(u32, Option<Proposer>, Offer)>> {
        if self.round >= self.config.max_rounds {
            return Ok(None);
        }
        let round = self.round + 1;
        let proposer = self.config.policy.proposer_for(round);
        let offer = self.generator.draw(self.source.as_mut(), round, proposer)?;
        Ok(Some((round, proposer, offer)))
    }

    fn open_round(&mut self, round: u32, proposer: Option<Proposer>, offer: Offer) {
        self.round = round;
        self.current_proposer = proposer;
        self.current_offer = Some(offer);
        NegotiationEventLogger::log_event(
            &self.session_id,
            NegotiationEvent::OfferDrawn {
                round,
                proposer: proposer.map(|p| p.to_string()),
                share_a: offer.share_a,
                share_b: offer.share_b,
            },
        );
    }

    fn finish(&mut self) {
        self.finished = true;
        self.log_end();
    }

    fn record(&mut self, decision: Decision, counter_value: Option<f64>) {
        let offer = self
            .current_offer
            .unwrap_or(Offer { share_a: f64::NAN, share_b: f64::NAN });
        self.history.push(HistoryEntry {
            session_id: self.session_id.clone(),
            round: self.round,
            proposer: self.current_proposer,
            offer_a: offer.share_a,
            offer_b: offer.share_b,
            decision,
            counter_value,
            timestamp: Utc::now(),
        });
        NegotiationEventLogger::log_event(
            &self.session_id,
            NegotiationEvent::DecisionRecorded {
                round: self.round,
                decision: decision.to_string(),
                counter_value,
            },
        );
    }

    fn log_end(&self) {
        let outcome = match self.status() {
            SessionStatus::Accepted => "accepted",
            SessionStatus::Rejected => "rejected",
            SessionStatus::InProgress => "in_progress",
        };
        NegotiationEventLogger::log_event(
            &self.session_id,
            NegotiationEvent::SessionEnded {
                outcome: outcome.to_string(),
                rounds: self.round,
                decisions: self.history.len(),
            },
        );
    }
}

pub fn policy_name(policy: &OfferPolicy) -> &'static str {
    match policy {
        OfferPolicy::FixedSkew { .. } => "fixed",
        OfferPolicy::AlternatingProposer { .. } => "alternating",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn started(config: SessionConfig, seed: u64) -> NegotiationSession {
        let mut s = NegotiationSession::with_seed(config, seed);
        assert!(s.start().unwrap());
        s
    }

    #[test]
    fn session_id_is_compact_utc_timestamp() {
        let t = Utc.with_ymd_and_hms(2025, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(session_id_at(t), "20250307090501");
        assert_eq!(new_session_id().len(), 14);
    }

    #[test]
    fn new_session_waits_for_start() {
        let mut s = NegotiationSession::with_seed(SessionConfig::fixed_skew(), 1);
        assert_eq!(s.round(), 0);
        assert!(s.current_offer().is_none());
        assert!(!s.accept().unwrap());
        assert!(s.history().is_empty());
    }

    #[test]
    fn start_opens_round_one() {
        let s = started(SessionConfig::alternating(), 2);
        assert_eq!(s.round(), 1);
        assert_eq!(s.current_proposer(), Some(Proposer::A));
        assert!(s.current_offer().is_some());
        assert_eq!(s.status(), SessionStatus::InProgress);
        assert!(s.history().is_empty());
    }

    #[test]
    fn start_twice_is_noop() {
        let mut s = started(SessionConfig::fixed_skew(), 3);
        let offer = s.current_offer();
        assert!(!s.start().unwrap());
        assert_eq!(s.current_offer(), offer);
        assert_eq!(s.round(), 1);
    }

    #[test]
    fn zero_rounds_rejects_immediately() {
        let s = started(SessionConfig::fixed_skew().with_max_rounds(0), 4);
        assert_eq!(s.status(), SessionStatus::Rejected);
        assert_eq!(s.round(), 0);
        assert!(s.current_offer().is_none());
        assert!(s.history().is_empty());
    }

    #[test]
    fn counter_is_ignored_under_fixed_skew() {
        let mut s = started(SessionConfig::fixed_skew(), 5);
        assert!(!s.counter(0.5).unwrap());
        assert_eq!(s.round(), 1);
        assert!(s.history().is_empty());
    }

    #[test]
    fn counter_clamps_and_nulls() {
        let mut s = started(SessionConfig::alternating(), 6);
        s.counter(-0.3).unwrap();
        s.counter_input("  0.25 ").unwrap();
        s.counter_input("abc").unwrap();
        s.counter(f64::INFINITY).unwrap();
        let values: Vec<_> = s.history().iter().map(|h| h.counter_value).collect();
        assert_eq!(values, vec![Some(0.0), Some(0.25), None, None]);
    }

    #[test]
    fn reset_starts_fresh() {
        let mut s = started(SessionConfig::fixed_skew(), 7);
        s.reject().unwrap();
        s.accept().unwrap();
        assert_eq!(s.status(), SessionStatus::Accepted);

        assert!(s.reset().unwrap());
        assert_eq!(s.round(), 1);
        assert_eq!(s.status(), SessionStatus::InProgress);
        assert!(s.history().is_empty());
        assert_eq!(s.session_id().len(), 14);
    }

    #[test]
    fn view_reflects_state() {
        let mut s = started(SessionConfig::alternating(), 8);
        s.reject().unwrap();
        let view = s.view();
        assert_eq!(view.round, 2);
        assert_eq!(view.max_rounds, MAX_ROUNDS);
        assert_eq!(view.proposer, Some(Proposer::B));
        assert!(view.offer.is_some());
        assert_eq!(view.history.len(), 1);
        assert_eq!(view.history[0].proposer, Some(Proposer::A));
    }

    #[test]
    fn config_validation() {
        assert!(SessionConfig::fixed_skew().validate().is_ok());
        let bad = SessionConfig::for_policy(OfferPolicy::FixedSkew { mean_a: 1.0 });
        assert!(bad.validate().is_err());
        let bad = SessionConfig::for_policy(OfferPolicy::AlternatingProposer { bias: 0.5 });
        assert!(bad.validate().is_err());
    }

    #[test]
    fn sampler_failure_leaves_session_untouched() {
        struct Stuck;
        impl UniformSource for Stuck {
            fn next_f64(&mut self) -> f64 {
                0.999_999
            }
        }
        let mut config = SessionConfig::fixed_skew();
        config.max_sampler_iterations = 10;
        let mut s = NegotiationSession::with_source(config, Box::new(Stuck));
        assert!(matches!(s.start(), Err(BargainError::Sampling { .. })));
        assert_eq!(s.round(), 0);
        assert!(s.current_offer().is_none());
    }

    #[test]
    fn failed_start_emits_no_events() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing_subscriber::layer::{Context, SubscriberExt};
        use tracing_subscriber::Layer;

        struct EventCount(Arc<AtomicUsize>);
        impl<S: tracing::Subscriber> Layer<S> for EventCount {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                if event.metadata().target() == bargain_logging::EVENT_TARGET {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        struct Stuck;
        impl UniformSource for Stuck {
            fn next_f64(&mut self) -> f64 {
                0.999_999
            }
        }

        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(EventCount(count.clone()));
        tracing::subscriber::with_default(subscriber, || {
            let mut config = SessionConfig::fixed_skew();
            config.max_sampler_iterations = 10;
            let mut s = NegotiationSession::with_source(config, Box::new(Stuck));
            assert!(s.start().is_err());
            assert!(s.start().is_err());
        });
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tracing::subscriber::with_default(
            tracing_subscriber::registry().with(EventCount(count.clone())),
            || {
                started(SessionConfig::fixed_skew(), 9);
            },
        );
        // SessionStarted + OfferDrawn
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
