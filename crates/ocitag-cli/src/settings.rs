use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

/// Per-profile defaults for the tool itself, keyed by OCI profile name in
/// `~/.ocitag/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileSettings {
    pub namespace: Option<String>,
    pub tag_name: Option<String>,
    pub format: Option<OutputFormat>,
}

pub type SettingsFile = HashMap<String, ProfileSettings>;

fn settings_path() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".ocitag")
        .join("config.toml"))
}

pub fn load_all_from(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file {}", path.display()))?;
    let settings: SettingsFile = toml::from_str(&content)
        .with_context(|| format!("Invalid settings file {}", path.display()))?;
    Ok(settings)
}

pub fn load_profile_from(path: &Path, profile: &str) -> Result<ProfileSettings> {
    let all = load_all_from(path)?;
    Ok(all
        .into_iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(profile))
        .map(|(_, v)| v)
        .unwrap_or_default())
}

pub fn load_profile(profile: &str) -> Result<ProfileSettings> {
    load_profile_from(&settings_path()?, profile)
}
