use crate::ai::{error::AiError, provider::AiProvider, types::*};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock behavior for the mock provider
#[derive(Debug, Clone, Default)]
pub enum MockBehavior {
    /// Answer in the shape matching the request: a chat completion for
    /// stateless bodies, a stateful response with a fresh id otherwise
    #[default]
    Success,
    /// Return this raw body regardless of the request
    Raw(Value),
    /// Fail with an HTTP error
    HttpError { status: u16, body: String },
    /// Replay behaviors in order, falling back to `Success` once drained
    Queue(VecDeque<MockBehavior>),
}

/// Mock AI provider for testing
#[derive(Clone, Default)]
pub struct MockProvider {
    behavior: Arc<Mutex<MockBehavior>>,
    captured_requests: Arc<Mutex<Vec<AskRequest>>>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            captured_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn get_call_count(&self) -> usize {
        self.captured_requests.lock().unwrap().len()
    }

    pub fn get_captured_requests(&self) -> Vec<AskRequest> {
        self.captured_requests.lock().unwrap().clone()
    }

    pub fn get_last_captured_request(&self) -> Option<AskRequest> {
        self.captured_requests.lock().unwrap().last().cloned()
    }

    fn next_behavior(&self) -> MockBehavior {
        let mut behavior = self.behavior.lock().unwrap();
        if let MockBehavior::Queue(queue) = &mut *behavior {
            return queue.pop_front().unwrap_or(MockBehavior::Success);
        }
        behavior.clone()
    }
}

fn success_body(request: &AskRequest, call: usize) -> Value {
    match &request.body {
        RequestBody::Chat(_) => json!({
            "choices": [{"message": {"role": "assistant", "content": "Mock response"}}]
        }),
        RequestBody::Stateful(_) => json!({
            "id": format!("resp_mock_{call}"),
            "output": [{
                "id": format!("msg_mock_{call}"),
                "type": "message",
                "role": "assistant",
                "status": "completed",
                "content": [{"type": "output_text", "text": "Mock response"}]
            }]
        }),
    }
}

#[async_trait::async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, request: &AskRequest) -> Result<ApiResponse, AiError> {
        let call = {
            let mut requests = self.captured_requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        match self.next_behavior() {
            MockBehavior::Success | MockBehavior::Queue(_) => {
                ApiResponse::from_value(success_body(request, call))
            }
            MockBehavior::Raw(value) => ApiResponse::from_value(value),
            MockBehavior::HttpError { status, body } => Err(AiError::Http { status, body }),
        }
    }
}
