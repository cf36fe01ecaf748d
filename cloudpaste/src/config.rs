// ABOUTME: Upload settings persistence with hierarchical TOML config files
// ABOUTME: Follows the XDG Base Directory layout, with a project-local file taking precedence

use anyhow::{anyhow, Context, Result};
use cloudpaste_sdk::RemoteConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const APP_DIR: &str = "cloudpaste";
pub const CONFIG_FILE: &str = "config.toml";
pub const PROJECT_CONFIG_FILE: &str = "cloudpaste.toml";

/// The three user-editable upload settings. Missing keys default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    CloudName,
    UploadPreset,
    Folder,
}

impl SettingField {
    pub const ALL: [SettingField; 3] = [
        SettingField::CloudName,
        SettingField::UploadPreset,
        SettingField::Folder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingField::CloudName => "cloud_name",
            SettingField::UploadPreset => "upload_preset",
            SettingField::Folder => "folder",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SettingField::CloudName => "Your Cloudinary cloud name",
            SettingField::UploadPreset => "Unsigned upload preset",
            SettingField::Folder => "Folder to store uploads in (optional)",
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cloud_name" => Ok(SettingField::CloudName),
            "upload_preset" => Ok(SettingField::UploadPreset),
            "folder" => Ok(SettingField::Folder),
            other => Err(anyhow!(
                "Unknown setting '{}'. Must be one of: cloud_name, upload_preset, folder",
                other
            )),
        }
    }
}

impl Settings {
    /// Load settings from a single file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })
    }

    /// Merge with another set of settings; non-empty values in `other` win
    pub fn merge(self, other: Settings) -> Settings {
        fn pick(base: String, over: String) -> String {
            if over.trim().is_empty() {
                base
            } else {
                over
            }
        }

        Settings {
            cloud_name: pick(self.cloud_name, other.cloud_name),
            upload_preset: pick(self.upload_preset, other.upload_preset),
            folder: pick(self.folder, other.folder),
        }
    }

    pub fn get(&self, field: SettingField) -> &str {
        match field {
            SettingField::CloudName => &self.cloud_name,
            SettingField::UploadPreset => &self.upload_preset,
            SettingField::Folder => &self.folder,
        }
    }

    /// Store a trimmed value
    pub fn set(&mut self, field: SettingField, value: &str) {
        let value = value.trim().to_string();
        match field {
            SettingField::CloudName => self.cloud_name = value,
            SettingField::UploadPreset => self.upload_preset = value,
            SettingField::Folder => self.folder = value,
        }
    }

    pub fn remote_config(&self) -> RemoteConfig {
        RemoteConfig::new(self.cloud_name.trim(), self.upload_preset.trim())
            .with_folder(self.folder.trim())
    }
}

/// Settings loaded from every config location, plus the file edits are written to.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    paths: Vec<PathBuf>,
    write_path: PathBuf,
    settings: Settings,
}

impl ConfigStore {
    /// Load from the standard locations, persisting edits to the user config file
    pub fn load() -> Result<Self> {
        let write_path = user_config_path()
            .ok_or_else(|| anyhow!("Could not determine a config directory"))?;
        Ok(Self::load_from_paths(config_paths(), write_path))
    }

    /// Load from explicit paths, lowest precedence first
    pub fn load_from_paths(paths: Vec<PathBuf>, write_path: PathBuf) -> Self {
        let settings = merge_paths(&paths);
        Self {
            paths,
            write_path,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn write_path(&self) -> &Path {
        &self.write_path
    }

    /// Set one field by name, persist it, and reload the merged view
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        let field: SettingField = field.parse()?;

        // A broken file is replaced, so `set` can repair it
        let mut stored = if self.write_path.exists() {
            Settings::load_from_file(&self.write_path).unwrap_or_else(|e| {
                log::warn!("Replacing unreadable config file: {:#}", e);
                Settings::default()
            })
        } else {
            Settings::default()
        };
        stored.set(field, value);
        self.save(&stored)?;

        log::debug!("Saved {} to {}", field, self.write_path.display());
        self.settings = merge_paths(&self.paths);
        Ok(())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.write_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        std::fs::write(&self.write_path, content).with_context(|| {
            format!("Failed to write config file: {}", self.write_path.display())
        })
    }
}

fn merge_paths(paths: &[PathBuf]) -> Settings {
    paths
        .iter()
        .filter(|path| path.exists())
        .fold(Settings::default(), |settings, path| {
            match Settings::load_from_file(path) {
                Ok(file_settings) => settings.merge(file_settings),
                Err(e) => {
                    log::warn!("Ignoring config file: {:#}", e);
                    settings
                }
            }
        })
}

/// User config file: `$XDG_CONFIG_HOME/cloudpaste/config.toml`, else `~/.config/cloudpaste/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILE));
    }

    dirs::home_dir().map(|home| home.join(".config").join(APP_DIR).join(CONFIG_FILE))
}

/// Config file paths in increasing order of precedence
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(path) = user_config_path() {
        paths.push(path);
    }

    // Project-specific config (highest precedence)
    if let Ok(current_dir) = std::env::current_dir() {
        paths.push(current_dir.join(PROJECT_CONFIG_FILE));
    }

    paths
}
