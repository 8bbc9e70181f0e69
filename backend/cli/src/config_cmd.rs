//! CLI Config Subcommand
//!
//! Prints the effective configuration, or writes it out as a starting file.

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::terminal_output::{note_info, note_success, note_warn};

pub async fn run(settings: Settings, init: bool) -> Result<()> {
    if init {
        if settings.config_path.exists() {
            note_warn(&format!(
                "{} already exists; leaving it alone",
                settings.config_path.display()
            ));
        } else {
            bargain_config::write_config(&settings.config, &settings.config_path).await?;
            note_success(&format!("wrote {}", settings.config_path.display()));
        }
        return Ok(());
    }

    note_info(&format!("config file: {}", settings.config_path.display()));
    for warning in bargain_config::validate(&settings.config).warnings {
        note_warn(&warning.to_string());
    }
    let yaml = serde_yaml::to_string(&settings.config).context("Failed to render config as YAML")?;
    print!("{yaml}");
    Ok(())
}
