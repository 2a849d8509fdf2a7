use crate::ai::{AiError, AiProvider, ApiResponse};
use crate::display::{render, response_texts};
use crate::file::{
    read_workspace_content, resolve_workspace_files, FileLister, GitCli, PathFilter,
    WorkspaceError,
};
use crate::preview::{should_show_preview, PREVIEW_TITLE};
use crate::prompt::build_prompt;
use crate::session::{DebugCapture, SessionState};
use crate::settings::{Settings, SettingsManager};
use crate::source::{
    active_function, active_tab, selected_text, LineRange, MessageType, SourceError,
};
use crate::ui::Interaction;
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

pub const THINKING_TITLE: &str = "Grok is thinking...";

#[derive(Error, Debug)]
pub enum AskError {
    #[error("API Key is required!")]
    MissingApiKey,

    #[error("A question is required!")]
    MissingQuestion,

    #[error("xAI model is required!")]
    MissingModel,

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// What a question is asked about.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentRequest {
    Workspace,
    Tab { path: PathBuf },
    Function { path: PathBuf, line: usize },
    Selection { path: PathBuf, lines: LineRange },
}

impl ContentRequest {
    pub fn message_type(&self) -> MessageType {
        match self {
            ContentRequest::Workspace => MessageType::Workspace,
            ContentRequest::Tab { .. } => MessageType::Tab,
            ContentRequest::Function { .. } => MessageType::Function,
            ContentRequest::Selection { .. } => MessageType::Selection,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AskOutcome {
    Sent {
        response_id: Option<String>,
        documents: Vec<PathBuf>,
    },
    /// The preview was declined; nothing was sent.
    Cancelled,
    /// The response did not have the shape the session mode expects.
    InvalidResponse,
}

pub struct AskCommand {
    settings: SettingsManager,
    provider: Arc<dyn AiProvider>,
    lister: Arc<dyn FileLister>,
    interaction: Box<dyn Interaction>,
    workspace_root: Option<PathBuf>,
}

impl AskCommand {
    pub fn new(
        settings: SettingsManager,
        provider: Arc<dyn AiProvider>,
        interaction: Box<dyn Interaction>,
        workspace_root: Option<PathBuf>,
    ) -> Self {
        Self {
            settings,
            provider,
            lister: Arc::new(GitCli),
            interaction,
            workspace_root,
        }
    }

    pub fn with_lister(mut self, lister: Arc<dyn FileLister>) -> Self {
        self.lister = lister;
        self
    }

    pub fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsManager {
        &mut self.settings
    }

    /// Asks one question about `request` and shows the answer on `out`.
    pub async fn run(
        &mut self,
        request: &ContentRequest,
        out: &mut dyn Write,
    ) -> Result<AskOutcome, AskError> {
        let kind = request.message_type();
        info!(%kind, provider = self.provider.name(), "Asking Grok");

        let raw = self.gather(request).await?;
        let api_key = self.ensure_api_key()?;

        let settings = self.settings.settings();
        let model = settings.model.trim().to_string();
        if model.is_empty() {
            return Err(AskError::MissingModel);
        }

        let question = self
            .interaction
            .question(settings.submit_with_editor)?
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .ok_or(AskError::MissingQuestion)?;

        self.settings
            .ensure_last_response_id(settings.enable_stateful_sessions)?;
        let settings = self.settings.settings();

        let prompt = build_prompt(kind, &raw, &question);
        if should_show_preview(settings.show_preview, kind)
            && !self.interaction.confirm(PREVIEW_TITLE, &prompt)?
        {
            info!("Preview declined");
            return Ok(AskOutcome::Cancelled);
        }

        let mut session = SessionState::from_settings(&settings);
        let ask = session.request(&api_key, &model, &prompt);
        let capture = settings.debug_capture_dir.clone().map(DebugCapture::new);
        if let Some(capture) = &capture {
            if let Err(e) = capture.request(&ask) {
                warn!(?e, "Failed to capture request");
            }
        }

        self.interaction.progress_started(THINKING_TITLE);
        let result = self.provider.send(&ask).await;
        self.interaction.progress_finished();

        let response = match result {
            Ok(response) => response,
            Err(AiError::InvalidResponse(detail)) => {
                warn!(%detail, "Unrecognized response shape");
                self.interaction.error(invalid_response_message(session.is_stateful()));
                return Ok(AskOutcome::InvalidResponse);
            }
            Err(e) => {
                error!(?e, "Request to Grok failed");
                return Err(e.into());
            }
        };

        if let Some(capture) = &capture {
            if let Err(e) = capture.response(&response) {
                warn!(?e, "Failed to capture response");
            }
        }

        if response.is_stateful() != session.is_stateful() {
            warn!(
                stateful = session.is_stateful(),
                "Response shape does not match session mode"
            );
            self.interaction.error(invalid_response_message(session.is_stateful()));
            return Ok(AskOutcome::InvalidResponse);
        }

        let rendered = render(
            settings.output_method,
            &response_texts(&response),
            out,
            &responses_dir(&settings)?,
        )?;
        self.interaction.info(rendered.message);

        let response_id = self.remember(&mut session, &response)?;
        Ok(AskOutcome::Sent {
            response_id,
            documents: rendered.documents,
        })
    }

    async fn gather(&self, request: &ContentRequest) -> Result<String, AskError> {
        match request {
            ContentRequest::Workspace => {
                let settings = self.settings.settings();
                let filter = PathFilter::new(&settings.exclude_files, &settings.include_files)?;
                let files = resolve_workspace_files(
                    self.workspace_root.as_deref(),
                    self.lister.as_ref(),
                    &filter,
                )
                .await?;
                info!(count = files.len(), "Reading workspace files");
                Ok(read_workspace_content(&files).await?)
            }
            ContentRequest::Tab { path } => Ok(active_tab(path).await?.raw()),
            ContentRequest::Function { path, line } => Ok(active_function(path, *line).await?),
            ContentRequest::Selection { path, lines } => Ok(selected_text(path, *lines).await?),
        }
    }

    fn ensure_api_key(&mut self) -> Result<String, AskError> {
        let settings = self.settings.settings();
        if let Some(key) = settings.api_key() {
            return Ok(key.to_string());
        }

        let key = self
            .interaction
            .api_key()?
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(AskError::MissingApiKey)?;
        self.settings.set_api_key(&key)?;
        info!("Saved API key");
        Ok(key)
    }

    fn remember(
        &mut self,
        session: &mut SessionState,
        response: &ApiResponse,
    ) -> Result<Option<String>, AskError> {
        let Some(id) = session.record(response) else {
            return Ok(response.response_id().map(str::to_string));
        };
        self.settings.set_last_response_id(&id)?;
        Ok(Some(id))
    }
}

fn invalid_response_message(stateful: bool) -> &'static str {
    if stateful {
        "No valid response from Grok Stateful API."
    } else {
        "No valid response from Grok."
    }
}

/// Directory tab output is written to, `~/.askgrok/responses` unless set.
pub fn responses_dir(settings: &Settings) -> anyhow::Result<PathBuf> {
    if let Some(dir) = &settings.responses_dir {
        return Ok(dir.clone());
    }
    let home = dirs::home_dir().context("Failed to get home directory")?;
    Ok(home.join(".askgrok").join("responses"))
}

/// Flips stateful sessions in the session scope and returns the new state.
pub fn toggle_stateful(settings: &mut SettingsManager) -> anyhow::Result<bool> {
    let enabled = !settings.settings().enable_stateful_sessions;
    settings.set_stateful(enabled)?;
    info!(enabled, "Toggled stateful sessions");
    Ok(enabled)
}

pub fn status_line(stateful: bool) -> &'static str {
    if stateful {
        "Grok - Stateful ON"
    } else {
        "Grok - Stateful OFF"
    }
}

/// Resolves `path` against `root` when it is relative.
pub fn resolve_path(root: Option<&Path>, path: &Path) -> PathBuf {
    match root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}
