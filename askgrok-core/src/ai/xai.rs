use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::ai::{error::AiError, provider::AiProvider, types::*};

pub const DEFAULT_API_BASE_URL: &str = "https://api.x.ai/v1";

#[derive(Clone)]
pub struct XaiProvider {
    client: Client,
    base_url: String,
}

impl XaiProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, body: &RequestBody) -> String {
        format!("{}/{}", self.base_url, body.endpoint())
    }
}

#[async_trait::async_trait]
impl AiProvider for XaiProvider {
    fn name(&self) -> &'static str {
        "xAI"
    }

    async fn send(&self, request: &AskRequest) -> Result<ApiResponse, AiError> {
        let url = self.url(&request.body);

        let request_json = serde_json::to_string(&request.body)?;
        debug!(%url, request_json = %request_json, "Full xAI request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", request.api_key))
            .header("Content-Type", "application/json")
            .json(&request.body)
            .send()
            .await
            .map_err(|e| {
                debug!(?e, "xAI API call failed");
                AiError::Network(anyhow::anyhow!("Network error: {}", e))
            })?;

        let status = response.status();
        info!(%status, stateful = request.body.is_stateful(), "xAI response received");

        let response_text = response
            .text()
            .await
            .map_err(|e| AiError::Network(anyhow::anyhow!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            debug!(?status, ?response_text, "xAI API returned error");
            return Err(AiError::Http {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let value: Value = serde_json::from_str(&response_text).map_err(|e| {
            AiError::Terminal(anyhow::anyhow!(
                "Failed to parse xAI response: {} - Response: {}",
                e,
                response_text
            ))
        })?;

        ApiResponse::from_value(value)
    }
}
