use crate::ai::xai::DEFAULT_API_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "grok-4";

/// Where responses are rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum OutputMethod {
    /// Each response becomes a new markdown document
    #[serde(rename = "tab")]
    Tab,
    /// Responses are appended to the terminal output
    #[default]
    #[serde(rename = "outputChannel")]
    OutputChannel,
}

/// When the assembled prompt is shown for confirmation before sending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum PreviewMode {
    #[serde(rename = "always")]
    Always,
    #[default]
    #[serde(rename = "workspace-only")]
    WorkspaceOnly,
    #[serde(rename = "never")]
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub output_method: OutputMethod,

    #[serde(default)]
    pub show_preview: PreviewMode,

    #[serde(default)]
    pub enable_stateful_sessions: bool,

    /// Collect the question in `$EDITOR` instead of a single input line
    #[serde(default)]
    pub submit_with_editor: bool,

    /// Id of the last stateful response, chained into the next request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_response_id: Option<String>,

    /// Basenames (exact, case-insensitive) or globs hiding workspace files
    #[serde(default = "default_exclude_files")]
    pub exclude_files: Vec<String>,

    /// Globs re-admitting excluded files and pulling in untracked ones
    #[serde(default)]
    pub include_files: Vec<String>,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses_dir: Option<PathBuf>,

    /// When set, every request and response body is written here as JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_capture_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            output_method: OutputMethod::default(),
            show_preview: PreviewMode::default(),
            enable_stateful_sessions: false,
            submit_with_editor: false,
            last_response_id: None,
            exclude_files: default_exclude_files(),
            include_files: Vec::new(),
            api_base_url: default_api_base_url(),
            responses_dir: None,
            debug_capture_dir: None,
        }
    }
}

impl Settings {
    /// Applies a workspace layer over these settings. Fields the layer sets
    /// win; everything else is inherited.
    pub fn merged(&self, layer: &SettingsLayer) -> Settings {
        let mut merged = self.clone();
        if let Some(api_key) = &layer.api_key {
            merged.api_key = Some(api_key.clone());
        }
        if let Some(model) = &layer.model {
            merged.model = model.clone();
        }
        if let Some(output_method) = layer.output_method {
            merged.output_method = output_method;
        }
        if let Some(show_preview) = layer.show_preview {
            merged.show_preview = show_preview;
        }
        if let Some(stateful) = layer.enable_stateful_sessions {
            merged.enable_stateful_sessions = stateful;
        }
        if let Some(submit_with_editor) = layer.submit_with_editor {
            merged.submit_with_editor = submit_with_editor;
        }
        if let Some(last_response_id) = &layer.last_response_id {
            merged.last_response_id = Some(last_response_id.clone());
        }
        if let Some(exclude_files) = &layer.exclude_files {
            merged.exclude_files = exclude_files.clone();
        }
        if let Some(include_files) = &layer.include_files {
            merged.include_files = include_files.clone();
        }
        if let Some(api_base_url) = &layer.api_base_url {
            merged.api_base_url = api_base_url.clone();
        }
        if let Some(responses_dir) = &layer.responses_dir {
            merged.responses_dir = Some(responses_dir.clone());
        }
        if let Some(debug_capture_dir) = &layer.debug_capture_dir {
            merged.debug_capture_dir = Some(debug_capture_dir.clone());
        }
        merged
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

/// Workspace-scoped overrides, stored in `<root>/.askgrok/settings.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SettingsLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_method: Option<OutputMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_preview: Option<PreviewMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_stateful_sessions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_with_editor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_response_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_capture_dir: Option<PathBuf>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

pub fn default_exclude_files() -> Vec<String> {
    [
        "node_modules",
        ".git",
        "dist",
        "out",
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "Cargo.lock",
        "**/*.log",
        ".gitignore",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
