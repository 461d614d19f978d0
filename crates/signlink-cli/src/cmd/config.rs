use super::{load_config, Overrides};
use crate::output::print_json;
use anyhow::{Context, Result};
use clap::Subcommand;
use signlink_core::config::{Config, WarnLevel};
use signlink_core::paths;
use std::path::Path;

const REDACTED: &str = "********";

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate the config for common mistakes
    Check,

    /// Print the effective config (token redacted)
    Show,

    /// Write a default signlink.yaml if none exists
    Init,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, overrides: &Overrides, subcmd: ConfigSubcommand, json: bool) -> Result<()> {
    match subcmd {
        ConfigSubcommand::Check => check(root, overrides, json),
        ConfigSubcommand::Show => show(root, overrides, json),
        ConfigSubcommand::Init => init(root, json),
    }
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

fn check(root: &Path, overrides: &Overrides, json: bool) -> Result<()> {
    let config = load_config(root, overrides)?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn redacted(mut config: Config) -> Config {
    if !config.api_token.is_empty() {
        config.api_token = REDACTED.to_string();
    }
    config
}

fn show(root: &Path, overrides: &Overrides, json: bool) -> Result<()> {
    let config = redacted(load_config(root, overrides)?);
    if json {
        return print_json(&config);
    }
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(root: &Path, json: bool) -> Result<()> {
    let path = paths::config_path(root);
    let created = !path.exists();
    if created {
        Config::default()
            .save(root)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if json {
        print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "created": created,
        }))?;
    } else if created {
        println!("Wrote {}", path.display());
    } else {
        println!("{} already exists; left unchanged.", path.display());
    }
    Ok(())
}
