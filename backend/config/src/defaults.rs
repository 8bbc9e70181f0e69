//! Config defaults: fills unset fields of a freshly loaded config.

use bargain_core::offer::{DEFAULT_BIAS, DEFAULT_MEAN_A};
use bargain_core::sampler::DEFAULT_MAX_ITERATIONS;
use bargain_core::MAX_ROUNDS;

use crate::schema::{
    BargainConfig, LoggingConfig, OfferSection, SamplerSection, SessionSection, Variant,
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default directory for rolling log files.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: BargainConfig) -> BargainConfig {
    let config = apply_session_defaults(config);
    let config = apply_offer_defaults(config);
    let config = apply_sampler_defaults(config);
    apply_logging_defaults(config)
}

fn apply_session_defaults(mut config: BargainConfig) -> BargainConfig {
    let session = config.session.get_or_insert_with(SessionSection::default);
    if session.max_rounds.is_none() {
        session.max_rounds = Some(MAX_ROUNDS);
    }
    if session.variant.is_none() {
        session.variant = Some(Variant::default());
    }
    config
}

/// The concentration schedule stays unset: it depends on the variant, which a
/// command-line override may still change after the file is written.
fn apply_offer_defaults(mut config: BargainConfig) -> BargainConfig {
    let offer = config.offer.get_or_insert_with(OfferSection::default);
    if offer.mean_a.is_none() {
        offer.mean_a = Some(DEFAULT_MEAN_A);
    }
    if offer.bias.is_none() {
        offer.bias = Some(DEFAULT_BIAS);
    }
    config
}

fn apply_sampler_defaults(mut config: BargainConfig) -> BargainConfig {
    let sampler = config.sampler.get_or_insert_with(SamplerSection::default);
    if sampler.max_iterations.is_none() {
        sampler.max_iterations = Some(DEFAULT_MAX_ITERATIONS);
    }
    config
}

fn apply_logging_defaults(mut config: BargainConfig) -> BargainConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.dir.is_none() {
        logging.dir = Some(DEFAULT_LOG_DIR.to_string());
    }
    config
}
