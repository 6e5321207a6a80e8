//! Configuration management
//!
//! Compatible with the desktop app settings.json format:
//! ```json
//! {
//!   "app": { ... },
//!   "importProfiles": { "profiles": { ... } }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::EntityKind;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    import_profiles: ImportProfilesContainer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportProfilesContainer {
    #[serde(default)]
    profiles: HashMap<String, ImportProfile>,
}

/// Causeway configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub import_profiles: HashMap<String, ImportProfile>,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the causeway directory
    pub fn load(causeway_dir: &Path) -> Result<Self> {
        let settings_path = causeway_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        Ok(Self {
            import_profiles: raw.import_profiles.profiles.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the causeway directory.
    /// Preserves settings the CLI doesn't manage.
    pub fn save(&self, causeway_dir: &Path) -> Result<()> {
        let settings_path = causeway_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.import_profiles.profiles = self.import_profiles.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

/// Saved import profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportProfile {
    pub entity: EntityKind,
    #[serde(default)]
    pub options: ProfileOptions,
}

/// Import options for profile storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileOptions {
    #[serde(default = "default_true")]
    pub skip_duplicates: bool,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            skip_duplicates: true,
        }
    }
}

fn default_true() -> bool {
    true
}
