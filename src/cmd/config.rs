//! Configuration view and validation command — `written-hug config`.

use anyhow::{Context, Result};
use std::path::Path;

use written_hug::config::HugToml;

pub fn cmd_config(config_path: &Path, settings: &HugToml, validate: bool, init: bool) -> Result<()> {
    if init {
        if config_path.exists() {
            println!("{} already exists", config_path.display());
        } else {
            HugToml::default().save(config_path)?;
            println!("Created {}", config_path.display());
        }
        return Ok(());
    }

    if validate {
        let warnings = settings.validate();
        if warnings.is_empty() {
            println!("Configuration is valid.");
        } else {
            println!("Configuration warnings:");
            for warning in &warnings {
                println!("  - {}", warning);
            }
        }
        return Ok(());
    }

    if config_path.exists() {
        println!("# Config file: {}", config_path.display());
    } else {
        println!("# No config file at {}; using defaults", config_path.display());
    }
    println!("# Effective values (with environment overrides, secrets redacted)");
    println!();
    let rendered =
        toml::to_string_pretty(&settings.redacted()).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}
