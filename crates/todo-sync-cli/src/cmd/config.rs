use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::Path;
use todo_sync_core::config::{settings_path, SyncSettings, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective settings (defaults merged with .todo-sync.yaml)
    Show,

    /// Validate .todo-sync.yaml for common mistakes
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let settings = SyncSettings::load(root).context("failed to load settings")?;
    if json {
        print_json(&settings)?;
    } else {
        let path = settings_path(root);
        if path.exists() {
            println!("# {}", path.display());
        } else {
            println!("# {} not found, using defaults", path.display());
        }
        print!("{}", serde_yaml::to_string(&settings)?);
    }
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let settings = SyncSettings::load(root).context("failed to load settings")?;
    let warnings = settings.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Settings are valid. No warnings.");
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
        anyhow::bail!("settings validation found errors");
    }
    Ok(())
}
