use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FundError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_org_name")]
    pub org_name: String,
    #[serde(default)]
    pub org_subtitle: String,
    /// Prefix of the verification reference printed on receipts.
    #[serde(default = "default_org_prefix")]
    pub org_prefix: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_org_name() -> String {
    "Masjid Ashraf ul Masajid".to_string()
}

fn default_org_prefix() -> String {
    "MAM".to_string()
}

fn default_currency() -> String {
    "Rs".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().display().to_string(),
            org_name: default_org_name(),
            org_subtitle: String::new(),
            org_prefix: default_org_prefix(),
            currency: default_currency(),
            log_level: default_log_level(),
        }
    }
}

/// The organization details printed on receipts and reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    pub name: String,
    pub subtitle: String,
    pub prefix: String,
    pub currency: String,
}

impl Settings {
    pub fn organization(&self) -> Organization {
        Organization {
            name: self.org_name.clone(),
            subtitle: self.org_subtitle.clone(),
            prefix: self.org_prefix.clone(),
            currency: self.currency.clone(),
        }
    }
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn settings_path() -> PathBuf {
    home().join(".config").join("fundbook").join("settings.json")
}

fn default_data_dir() -> PathBuf {
    home().join("Documents").join("fundbook")
}

/// Read settings from `path`. A missing or unreadable file yields defaults.
pub fn load_from(path: &Path) -> Settings {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

pub fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(settings)
        .map_err(|e| FundError::Settings(e.to_string()))?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_settings() -> Settings {
    load_from(&settings_path())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_to(&settings_path(), settings)
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(load_settings().data_dir)
}

pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("fundbook.db")
}

/// Expand a leading `~` and make the path absolute when it already exists.
pub fn shellexpand_path(path: &str) -> String {
    let expanded = match path.strip_prefix('~') {
        Some(rest) => format!("{}{rest}", home().display()),
        None => path.to_string(),
    };
    std::fs::canonicalize(&expanded)
        .map(|p| p.display().to_string())
        .unwrap_or(expanded)
}
