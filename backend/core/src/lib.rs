pub mod error;
pub mod offer;
pub mod rng;
pub mod sampler;
pub mod session;
pub mod transcript;
pub mod types;

pub use error::BargainError;
pub use offer::{Concentration, OfferGenerator, OfferPolicy};
pub use rng::{SeededSource, ThreadRngSource, UniformSource};
pub use sampler::RandomSampler;
pub use session::{NegotiationSession, SessionConfig, MAX_ROUNDS};
pub use transcript::{TranscriptExporter, TranscriptFormat};
pub use types::{Decision, HistoryEntry, Offer, Proposer, SessionStatus, SessionView};
