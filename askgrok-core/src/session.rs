use crate::ai::types::{
    ApiResponse, AskRequest, ChatCompletionRequest, RequestBody, ResponsesRequest,
};
use crate::settings::Settings;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Conversation state carried from one request to the next. In stateful
/// mode the id of the last response is sent back so the server can continue
/// the same conversation; the caller persists it between runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    stateful: bool,
    last_response_id: Option<String>,
}

impl SessionState {
    pub fn new(stateful: bool, last_response_id: Option<String>) -> Self {
        Self {
            stateful,
            last_response_id,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.enable_stateful_sessions,
            settings.last_response_id.clone(),
        )
    }

    pub fn is_stateful(&self) -> bool {
        self.stateful
    }

    /// Stored id, ignoring the empty placeholder written on first use.
    pub fn last_response_id(&self) -> Option<&str> {
        self.last_response_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn request(&self, api_key: &str, model: &str, prompt: &str) -> AskRequest {
        let body = if self.stateful {
            RequestBody::Stateful(ResponsesRequest::new(
                model,
                prompt,
                self.last_response_id().map(str::to_string),
            ))
        } else {
            RequestBody::Chat(ChatCompletionRequest::new(model, prompt))
        };
        AskRequest {
            api_key: api_key.to_string(),
            body,
        }
    }

    /// Takes the id of a stateful response as the new continuation point.
    /// Returns the id when it changed.
    pub fn record(&mut self, response: &ApiResponse) -> Option<String> {
        if !self.stateful {
            return None;
        }
        let id = response.response_id()?;
        if self.last_response_id() == Some(id) {
            return None;
        }
        info!(response_id = id, "Continuing stateful session");
        self.last_response_id = Some(id.to_string());
        Some(id.to_string())
    }
}

/// Writes request and response bodies to a directory for inspection.
#[derive(Debug, Clone)]
pub struct DebugCapture {
    dir: PathBuf,
    stamp: String,
}

impl DebugCapture {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            stamp: Utc::now().format("%Y%m%dT%H%M%S%.3f").to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn request(&self, request: &AskRequest) -> Result<PathBuf> {
        self.write("request", &request.body)
    }

    pub fn response(&self, response: &ApiResponse) -> Result<PathBuf> {
        self.write("response", response)
    }

    fn write<T: Serialize>(&self, kind: &str, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create capture directory: {:?}", self.dir))?;
        let path = self.dir.join(format!("{}-{kind}.json", self.stamp));
        let json = serde_json::to_string_pretty(value).context("Failed to serialize capture")?;
        fs::write(&path, json).with_context(|| format!("Failed to write capture {path:?}"))?;
        debug!(?path, "Captured {kind}");
        Ok(path)
    }
}
