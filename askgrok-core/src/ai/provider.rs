use crate::ai::{error::AiError, types::*};

#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sends one prompt to the remote API. The endpoint is chosen by the
    /// request body: chat completions for stateless requests, responses for
    /// stateful ones.
    async fn send(&self, request: &AskRequest) -> Result<ApiResponse, AiError>;
}
