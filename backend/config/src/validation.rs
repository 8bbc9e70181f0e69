//! Config validation: range checks with field paths in the messages.

use thiserror::Error;

use crate::schema::BargainConfig;

/// Round counts above this are allowed but flagged.
const MAX_ROUNDS_WARN: u32 = 20;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &BargainConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_session(config, &mut report);
    validate_offer(config, &mut report);
    validate_sampler(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_session(config: &BargainConfig, report: &mut ValidationReport) {
    let Some(session) = &config.session else { return };
    match session.max_rounds {
        Some(0) => report.warn(
            "session.maxRounds",
            "maxRounds is 0; every session ends rejected without an offer",
        ),
        Some(n) if n > MAX_ROUNDS_WARN => report.warn(
            "session.maxRounds",
            format!("maxRounds {n} is unusually long; offers converge well before that"),
        ),
        _ => {}
    }
}

fn validate_offer(config: &BargainConfig, report: &mut ValidationReport) {
    let Some(offer) = &config.offer else { return };
    if let Some(mean_a) = offer.mean_a {
        if !(mean_a > 0.0 && mean_a < 1.0) {
            report.error("offer.meanA", format!("meanA must be in (0, 1), got {mean_a}"));
        }
    }
    if let Some(bias) = offer.bias {
        if !(0.0..0.5).contains(&bias) {
            report.error("offer.bias", format!("bias must be in [0, 0.5), got {bias}"));
        }
    }
    if let Some(base) = offer.concentration_base {
        if !(base > 0.0) {
            report.error("offer.concentrationBase", "concentrationBase must be > 0");
        }
    }
    if let Some(step) = offer.concentration_per_round {
        if !(step > 0.0) {
            report.error(
                "offer.concentrationPerRound",
                "concentrationPerRound must be > 0 so offers tighten each round",
            );
        }
    }
}

fn validate_sampler(config: &BargainConfig, report: &mut ValidationReport) {
    let Some(sampler) = &config.sampler else { return };
    if sampler.max_iterations == Some(0) {
        report.error("sampler.maxIterations", "maxIterations must be >= 1");
    }
}

fn validate_logging(config: &BargainConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !matches!(
            level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            report.warn(
                "logging.level",
                format!("Unknown log level '{level}'; RUST_LOG-style directives are passed through"),
            );
        }
    }
}
