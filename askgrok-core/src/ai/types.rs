use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::error::AiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body for `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub stream: bool,
    pub temperature: f32,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            model: model.into(),
            stream: false,
            temperature: 0.0,
        }
    }
}

/// Body for `POST /responses`. The server keeps the conversation when
/// `store` is set and chains it through `previous_response_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsesRequest {
    pub input: Vec<ChatMessage>,
    pub model: String,
    pub stream: bool,
    pub temperature: f32,
    pub store: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

impl ResponsesRequest {
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        previous_response_id: Option<String>,
    ) -> Self {
        Self {
            input: vec![ChatMessage::user(prompt)],
            model: model.into(),
            stream: false,
            temperature: 0.0,
            store: true,
            previous_response_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBody {
    Chat(ChatCompletionRequest),
    Stateful(ResponsesRequest),
}

impl RequestBody {
    /// Path of the endpoint relative to the API base url.
    pub fn endpoint(&self) -> &'static str {
        match self {
            RequestBody::Chat(_) => "chat/completions",
            RequestBody::Stateful(_) => "responses",
        }
    }

    pub fn is_stateful(&self) -> bool {
        matches!(self, RequestBody::Stateful(_))
    }

    pub fn previous_response_id(&self) -> Option<&str> {
        match self {
            RequestBody::Chat(_) => None,
            RequestBody::Stateful(request) => request.previous_response_id.as_deref(),
        }
    }
}

/// A body plus the credential it is sent with. The credential never ends up
/// in the serialized body.
#[derive(Debug, Clone)]
pub struct AskRequest {
    pub api_key: String,
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputContentBlock {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryBlock {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One entry of `output[]`. Reasoning items usually carry only a summary,
/// message items carry content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputItem {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<OutputContentBlock>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<SummaryBlock>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatefulResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub output: Vec<OutputItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Chat(ChatCompletionResponse),
    Stateful(StatefulResponse),
}

impl ApiResponse {
    /// Classifies a raw response body by its discriminating field: a
    /// non-empty `choices` array is a chat completion, a non-empty `output`
    /// array is a stateful response.
    pub fn from_value(value: Value) -> Result<Self, AiError> {
        if non_empty_array(&value, "choices") {
            return Ok(ApiResponse::Chat(serde_json::from_value(value)?));
        }
        if non_empty_array(&value, "output") {
            return Ok(ApiResponse::Stateful(serde_json::from_value(value)?));
        }
        Err(AiError::InvalidResponse(
            "response has neither choices nor output".to_string(),
        ))
    }

    pub fn is_stateful(&self) -> bool {
        matches!(self, ApiResponse::Stateful(_))
    }

    /// Server-assigned id of a stateful response.
    pub fn response_id(&self) -> Option<&str> {
        match self {
            ApiResponse::Chat(_) => None,
            ApiResponse::Stateful(response) => {
                response.id.as_deref().filter(|id| !id.is_empty())
            }
        }
    }
}

fn non_empty_array(value: &Value, field: &str) -> bool {
    value
        .get(field)
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}
