//! `bargain-config`: configuration for the bargaining engine.
//!
//! Provides:
//! - Typed config schema (session, offer, sampler, logging)
//! - YAML read/write with atomic backup rotation
//! - Default value application
//! - Range validation

pub mod defaults;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{BargainConfig, Variant};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Load a config file, run `overlay` on the raw values, then apply defaults
/// and validate.
///
/// The overlay sees the file before defaults, so variant-dependent defaults
/// follow whatever it sets.
pub async fn load_and_prepare<F>(path: &Path, overlay: F) -> Result<BargainConfig>
where
    F: FnOnce(BargainConfig) -> BargainConfig,
{
    prepare(overlay(load_config(path).await?))
        .with_context(|| format!("Invalid config at {}", path.display()))
}

/// Apply defaults and validate an already-loaded config.
///
/// Warnings are logged; any validation error fails.
pub fn prepare(config: BargainConfig) -> Result<BargainConfig> {
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("{} invalid config value(s); first: {}", report.errors.len(), first);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepares_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_and_prepare(&dir.path().join("config.yaml"), |c| c)
            .await
            .unwrap();
        assert_eq!(cfg.variant(), Variant::Fixed);
        assert_eq!(cfg.log_dir(), "logs");
    }

    #[tokio::test]
    async fn rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "offer:\n  meanA: 2.0\n").unwrap();
        let err = load_and_prepare(&path, |c| c).await.unwrap_err();
        assert!(format!("{err:#}").contains("offer.meanA"));
    }

    #[tokio::test]
    async fn overlay_runs_before_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let written = load_and_prepare(&path, |c| c).await.unwrap();
        write_config(&written, &path).await.unwrap();

        let cfg = load_and_prepare(&path, |mut c| {
            c.session.get_or_insert_with(Default::default).variant = Some(Variant::Alternating);
            c
        })
        .await
        .unwrap();
        let conc = cfg.session_config().concentration;
        assert_eq!(conc, bargain_core::Concentration::new(14.0, 6.0));
    }
}
