use crate::slack::SlackClient;
use crate::state::AppState;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use gull::agent::Agent;
use gull::models::message::Message;
use gull::models::tool::Tool;
use gull::providers::base::{Provider, Usage};
use gull::tools::Toolbox;
use std::sync::{Arc, Mutex};

/// Answers every completion with the same text, or fails when given none.
/// Records the conversations it was shown.
#[derive(Clone, Default)]
pub struct CannedProvider {
    reply: Option<String>,
    seen: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl CannedProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            seen: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> Vec<Vec<Message>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for CannedProvider {
    async fn complete(
        &self,
        _system: &str,
        messages: &[Message],
        _tools: &[Tool],
        _max_tokens: Option<i32>,
    ) -> Result<(Message, Usage)> {
        self.seen.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Some(text) => Ok((Message::assistant().with_text(text.clone()), Usage::default())),
            None => Err(anyhow!("model unavailable")),
        }
    }
}

pub fn test_state(slack_host: String, provider: CannedProvider, secret: Option<&str>) -> AppState {
    let agent = Agent::new(Box::new(provider), Toolbox::new());
    AppState {
        agent: Arc::new(agent),
        slack: Arc::new(SlackClient::new(slack_host, "xoxb-test".to_string()).unwrap()),
        bot_user_id: "UBOT".to_string(),
        signing_secret: secret.map(str::to_string),
    }
}
