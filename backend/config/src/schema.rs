//! Bargainer configuration schema.
//!
//! Every section is optional so a partial YAML file still parses; unset
//! fields are filled by [`crate::defaults::apply_all_defaults`].

use bargain_core::offer::{DEFAULT_BIAS, DEFAULT_MEAN_A};
use bargain_core::sampler::DEFAULT_MAX_ITERATIONS;
use bargain_core::{Concentration, OfferPolicy, SessionConfig, MAX_ROUNDS};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BargainConfig {
    /// Round limit and offer variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionSection>,

    /// Skew and concentration of generated offers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<OfferSection>,

    /// Gamma sampler limits and seeding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<SamplerSection>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

/// Which offer mechanism a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Constant skew favoring B; accept or reject only.
    #[default]
    Fixed,
    /// Proposer alternates each round; counter-offers allowed.
    Alternating,
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" | "v1" => Ok(Variant::Fixed),
            "alternating" | "v2" => Ok(Variant::Alternating),
            other => Err(format!("unknown variant '{other}', use 'fixed' or 'alternating'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferSection {
    /// Party A's mean share under the fixed variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_a: Option<f64>,
    /// Proposer's self-favoring tilt under the alternating variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration_base: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concentration_per_round: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for the rolling NDJSON log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl BargainConfig {
    pub fn variant(&self) -> Variant {
        self.session
            .as_ref()
            .and_then(|s| s.variant)
            .unwrap_or_default()
    }

    pub fn seed(&self) -> Option<u64> {
        self.sampler.as_ref().and_then(|s| s.seed)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn log_dir(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.dir.as_deref())
            .unwrap_or("logs")
    }

    pub fn policy(&self) -> OfferPolicy {
        let offer = self.offer.clone().unwrap_or_default();
        match self.variant() {
            Variant::Fixed => OfferPolicy::FixedSkew {
                mean_a: offer.mean_a.unwrap_or(DEFAULT_MEAN_A),
            },
            Variant::Alternating => OfferPolicy::AlternatingProposer {
                bias: offer.bias.unwrap_or(DEFAULT_BIAS),
            },
        }
    }

    /// Core session settings; unset fields fall back to the variant's defaults.
    pub fn session_config(&self) -> SessionConfig {
        let policy = self.policy();
        let default_conc = policy.default_concentration();
        let offer = self.offer.clone().unwrap_or_default();
        SessionConfig {
            max_rounds: self
                .session
                .as_ref()
                .and_then(|s| s.max_rounds)
                .unwrap_or(MAX_ROUNDS),
            policy,
            concentration: Concentration::new(
                offer.concentration_base.unwrap_or(default_conc.base),
                offer
                    .concentration_per_round
                    .unwrap_or(default_conc.per_round),
            ),
            max_sampler_iterations: self
                .sampler
                .as_ref()
                .and_then(|s| s.max_iterations)
                .unwrap_or(DEFAULT_MAX_ITERATIONS),
        }
    }
}
