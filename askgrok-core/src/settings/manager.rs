use crate::settings::config::{Settings, SettingsLayer};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SETTINGS_DIR: &str = ".askgrok";
const SETTINGS_FILE: &str = "settings.toml";

/// Global settings plus the optional workspace layer on top of them. Reads
/// always see the merged view; writes go to the scope each setting belongs
/// to (the credential is global, session state follows the workspace).
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings_path: PathBuf,
    workspace_path: Option<PathBuf>,
    global: Settings,
    workspace: SettingsLayer,
}

impl SettingsManager {
    /// Create a new settings manager with default settings location
    pub fn new(workspace_root: Option<&Path>) -> Result<Self> {
        let settings_path = Self::default_settings_path()?;
        Self::from_path(settings_path, workspace_root)
    }

    /// Create a settings manager from a specific global settings path
    pub fn from_path(path: PathBuf, workspace_root: Option<&Path>) -> Result<Self> {
        if !path.exists() {
            write_toml(&path, &Settings::default())?;
        }

        let global = Self::load_from_file_with_backup(&path)?;

        let workspace_path = workspace_root.map(Self::workspace_settings_path);
        let workspace = match &workspace_path {
            Some(workspace_path) => Self::load_layer(workspace_path)?,
            None => SettingsLayer::default(),
        };

        Ok(Self {
            settings_path: path,
            workspace_path,
            global,
            workspace,
        })
    }

    /// Get the default settings path (~/.askgrok/settings.toml)
    fn default_settings_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    pub fn workspace_settings_path(root: &Path) -> PathBuf {
        root.join(SETTINGS_DIR).join(SETTINGS_FILE)
    }

    /// Load settings from a TOML file with backup on parse failure
    fn load_from_file_with_backup(path: &Path) -> Result<Settings> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {path:?}"))?;

        match toml::from_str(&contents) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                let backup_path = path.with_extension("toml.backup");
                warn!(?e, ?backup_path, "Settings file is corrupted, restoring defaults");
                fs::rename(path, &backup_path).with_context(|| {
                    format!("Failed to backup corrupted settings to {backup_path:?}")
                })?;

                let default_settings = Settings::default();
                write_toml(path, &default_settings)?;

                Ok(default_settings)
            }
        }
    }

    /// Workspace files are user-edited alongside the project, so a broken
    /// one is reported rather than replaced.
    fn load_layer(path: &Path) -> Result<SettingsLayer> {
        if !path.exists() {
            return Ok(SettingsLayer::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read workspace settings from {path:?}"))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse workspace settings {path:?}"))
    }

    /// Merged settings as seen by a request
    pub fn settings(&self) -> Settings {
        self.global.merged(&self.workspace)
    }

    pub fn has_workspace(&self) -> bool {
        self.workspace_path.is_some()
    }

    /// Get the global settings file path
    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    pub fn workspace_path(&self) -> Option<&Path> {
        self.workspace_path.as_deref()
    }

    pub fn set_api_key(&mut self, api_key: &str) -> Result<()> {
        self.global.api_key = Some(api_key.trim().to_string());
        self.save_global()
    }

    pub fn set_last_response_id(&mut self, id: &str) -> Result<()> {
        if self.has_workspace() {
            self.workspace.last_response_id = Some(id.to_string());
            self.save_workspace()
        } else {
            self.global.last_response_id = Some(id.to_string());
            self.save_global()
        }
    }

    pub fn set_stateful(&mut self, enabled: bool) -> Result<()> {
        if self.has_workspace() {
            self.workspace.enable_stateful_sessions = Some(enabled);
            self.save_workspace()
        } else {
            self.global.enable_stateful_sessions = enabled;
            self.save_global()
        }
    }

    /// Creates an empty `last_response_id` in the session scope the first
    /// time a stateful request is made, so the key exists before it is read.
    pub fn ensure_last_response_id(&mut self, stateful: bool) -> Result<()> {
        if !stateful || self.settings().last_response_id.is_some() {
            return Ok(());
        }
        info!("Initializing last_response_id");
        self.set_last_response_id("")
    }

    fn save_global(&self) -> Result<()> {
        write_toml(&self.settings_path, &self.global)
    }

    fn save_workspace(&self) -> Result<()> {
        let Some(path) = &self.workspace_path else {
            return Ok(());
        };
        write_toml(path, &self.workspace)
    }
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {parent:?}"))?;
    }
    let contents = toml::to_string_pretty(value).context("Failed to serialize settings")?;
    fs::write(path, contents).with_context(|| format!("Failed to write settings to {path:?}"))
}
