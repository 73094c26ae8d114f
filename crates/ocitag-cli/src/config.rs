//! OCI SDK/CLI config file (`~/.oci/config`).
//!
//! INI sections are profiles. Named profiles inherit keys they don't set from
//! `[DEFAULT]`, the same way the OCI SDKs read the file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_PROFILE: &str = "DEFAULT";

#[derive(Debug, Clone, Default, Deserialize)]
struct RawProfile {
    user: Option<String>,
    fingerprint: Option<String>,
    key_file: Option<String>,
    tenancy: Option<String>,
    region: Option<String>,
    pass_phrase: Option<String>,
}

impl RawProfile {
    fn or(self, fallback: &RawProfile) -> RawProfile {
        RawProfile {
            user: self.user.or_else(|| fallback.user.clone()),
            fingerprint: self.fingerprint.or_else(|| fallback.fingerprint.clone()),
            key_file: self.key_file.or_else(|| fallback.key_file.clone()),
            tenancy: self.tenancy.or_else(|| fallback.tenancy.clone()),
            region: self.region.or_else(|| fallback.region.clone()),
            pass_phrase: self.pass_phrase.or_else(|| fallback.pass_phrase.clone()),
        }
    }
}

/// A fully resolved API-key profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OciProfile {
    pub user: String,
    pub fingerprint: String,
    pub key_file: PathBuf,
    pub tenancy: String,
    pub region: String,
    pub pass_phrase: Option<String>,
}

impl OciProfile {
    /// `keyId` of the request signature.
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".oci")
        .join("config"))
}

pub fn load_profile(path: &Path, profile: &str) -> Result<OciProfile> {
    let sections: HashMap<String, RawProfile> = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Ini))
        .build()
        .with_context(|| format!("Failed to read OCI config file {}", path.display()))?
        .try_deserialize()
        .with_context(|| format!("Invalid OCI config file {}", path.display()))?;

    resolve_profile(sections, profile)
        .with_context(|| format!("Invalid profile \"{profile}\" in {}", path.display()))
}

fn resolve_profile(mut sections: HashMap<String, RawProfile>, profile: &str) -> Result<OciProfile> {
    let defaults = take_section(&mut sections, DEFAULT_PROFILE).unwrap_or_default();
    let raw = if profile.eq_ignore_ascii_case(DEFAULT_PROFILE) {
        defaults
    } else {
        take_section(&mut sections, profile)
            .with_context(|| format!("Profile \"{profile}\" not found"))?
            .or(&defaults)
    };

    let mut missing = Vec::new();
    let mut require = |value: Option<String>, key: &'static str| {
        let value = value.filter(|v| !v.trim().is_empty());
        if value.is_none() {
            missing.push(key);
        }
        value.unwrap_or_default()
    };
    let user = require(raw.user, "user");
    let fingerprint = require(raw.fingerprint, "fingerprint");
    let key_file = require(raw.key_file, "key_file");
    let tenancy = require(raw.tenancy, "tenancy");
    let region = require(raw.region, "region");
    if !missing.is_empty() {
        anyhow::bail!("Missing required keys: {}", missing.join(", "));
    }

    Ok(OciProfile {
        user,
        fingerprint,
        key_file: expand_home(&key_file)?,
        tenancy,
        region,
        pass_phrase: raw.pass_phrase.filter(|p| !p.is_empty()),
    })
}

// Section names may come back lower-cased depending on the parser, so match
// them case-insensitively.
fn take_section(sections: &mut HashMap<String, RawProfile>, name: &str) -> Option<RawProfile> {
    let key = sections
        .keys()
        .find(|k| k.eq_ignore_ascii_case(name))
        .cloned()?;
    sections.remove(&key)
}

fn expand_home(path: &str) -> Result<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().context("Cannot determine home directory")?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(path))
}
