use anyhow::anyhow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("Network error: {0}")]
    Network(anyhow::Error),

    #[error("xAI API error {status}: {body}")]
    Http { status: u16, body: String },

    /// The body parsed as JSON but carried neither `choices` nor `output`.
    #[error("No valid response: {0}")]
    InvalidResponse(String),

    #[error("Terminal error: {0}")]
    Terminal(anyhow::Error),
}

impl From<serde_json::Error> for AiError {
    fn from(source: serde_json::Error) -> Self {
        Self::Terminal(anyhow!(source))
    }
}
