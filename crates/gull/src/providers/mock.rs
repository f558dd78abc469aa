use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, Usage};

/// A recorded call to the mock provider
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<Tool>,
    pub max_tokens: Option<i32>,
}

/// A mock provider that returns pre-configured responses for testing
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<Message, String>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    repeat_last: bool,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().map(Ok).collect())),
            calls: Arc::new(Mutex::new(Vec::new())),
            repeat_last: false,
        }
    }

    /// A provider whose every completion fails with the given error
    pub fn failing<S: Into<String>>(error: S) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![Err(error.into())])),
            calls: Arc::new(Mutex::new(Vec::new())),
            repeat_last: true,
        }
    }

    /// A provider that answers with the same message forever
    pub fn repeating(response: Message) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![Ok(response)])),
            calls: Arc::new(Mutex::new(Vec::new())),
            repeat_last: true,
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        max_tokens: Option<i32>,
    ) -> Result<(Message, Usage)> {
        self.calls.lock().unwrap().push(MockCall {
            system: system.to_string(),
            messages: messages.to_vec(),
            tools: tools.to_vec(),
            max_tokens,
        });

        let mut responses = self.responses.lock().unwrap();
        let next = if self.repeat_last && responses.len() == 1 {
            responses[0].clone()
        } else if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok(Message::assistant().with_text(""))
        } else {
            responses.remove(0)
        };

        next.map(|message| (message, Usage::default()))
            .map_err(|e| anyhow!(e))
    }
}
