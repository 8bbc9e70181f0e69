use std::path::PathBuf;

use anyhow::Result;
use bargain_config::schema::{SamplerSection, SessionSection};
use bargain_config::{BargainConfig, Variant};
use bargain_core::SessionConfig;

/// Effective CLI settings: the config file with command-line overrides applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub config: BargainConfig,
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub variant: Option<Variant>,
    pub seed: Option<u64>,
    pub max_rounds: Option<u32>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Resolve the config path: explicit flag > `BARGAIN_CONFIG` env > config dir.
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| std::env::var("BARGAIN_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| bargain_config::config_file_path(&bargain_config::config_dir()))
    }

    pub async fn load(explicit: Option<PathBuf>, overrides: Overrides) -> Result<Self> {
        let config_path = Self::resolve_path(explicit);
        let config =
            bargain_config::load_and_prepare(&config_path, |raw| apply_overrides(raw, overrides))
                .await?;
        Ok(Self { config_path, config })
    }

    pub fn session_config(&self) -> Result<SessionConfig> {
        let session = self.config.session_config();
        session.validate()?;
        Ok(session)
    }

    pub fn seed(&self) -> Option<u64> {
        self.config.seed()
    }

    pub fn variant(&self) -> Variant {
        self.config.variant()
    }
}

pub fn apply_overrides(mut config: BargainConfig, overrides: Overrides) -> BargainConfig {
    if overrides.variant.is_some() || overrides.max_rounds.is_some() {
        let session = config.session.get_or_insert_with(SessionSection::default);
        if let Some(variant) = overrides.variant {
            session.variant = Some(variant);
        }
        if let Some(max_rounds) = overrides.max_rounds {
            session.max_rounds = Some(max_rounds);
        }
    }
    if let Some(seed) = overrides.seed {
        config.sampler.get_or_insert_with(SamplerSection::default).seed = Some(seed);
    }
    if let Some(level) = overrides.log_level {
        config.logging.get_or_insert_with(Default::default).level = Some(level);
    }
    config
}
