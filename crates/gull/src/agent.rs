use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;

use crate::errors::{AgentError, AgentResult};
use crate::formatting::to_slack_mrkdwn;
use crate::models::message::Message;
use crate::prompt_template::system_prompt;
use crate::providers::base::Provider;
use crate::tools::Toolbox;

/// The only text a user ever sees when a reply could not be produced
pub const APOLOGY: &str = "Sorry, I couldn't generate a response. Please try again.";

pub const DEFAULT_MAX_TOKENS: i32 = 1000;
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Receives human readable progress for a reply, e.g. a Slack thread status
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn update(&self, status: &str);
}

#[async_trait]
impl StatusSink for mpsc::UnboundedSender<String> {
    async fn update(&self, status: &str) {
        // A closed receiver means nobody is listening anymore
        let _ = self.send(status.to_string());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    /// Output token ceiling for each model call
    pub max_tokens: i32,
    /// Maximum number of model calls in one generation
    pub max_steps: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// The outcome of a multi-step generation
#[derive(Debug, Clone)]
pub struct Generation {
    /// Text of the final model step, before any formatting
    pub text: String,
    /// Number of model calls made
    pub steps: usize,
    /// Every message produced while generating, tool requests and responses included
    pub trace: Vec<Message>,
}

/// Agent turns a conversation into a single reply, letting the model drive the tools
pub struct Agent {
    provider: Box<dyn Provider>,
    toolbox: Toolbox,
    settings: GenerationSettings,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, toolbox: Toolbox) -> Self {
        Self {
            provider,
            toolbox,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    fn get_system_prompt(&self) -> AgentResult<String> {
        system_prompt(Utc::now().date_naive()).map_err(|e| AgentError::Internal(e.to_string()))
    }

    /// Run the model over the history, executing requested tools between steps
    /// until it answers in text or the step budget runs out.
    pub async fn run(&self, history: &[Message]) -> Result<Generation> {
        let system_prompt = self.get_system_prompt()?;
        let tools = self.toolbox.tools();
        let mut messages = history.to_vec();
        let mut trace = Vec::new();
        let mut steps = 0;

        loop {
            let (response, usage) = self
                .provider
                .complete(
                    &system_prompt,
                    &messages,
                    &tools,
                    Some(self.settings.max_tokens),
                )
                .await?;
            steps += 1;
            tracing::debug!(step = steps, ?usage, "model step completed");

            messages.push(response.clone());
            trace.push(response.clone());

            let requests = response.tool_requests();
            if requests.is_empty() || steps >= self.settings.max_steps {
                if !requests.is_empty() {
                    tracing::warn!(
                        max_steps = self.settings.max_steps,
                        "step limit reached with tool calls pending"
                    );
                }
                return Ok(Generation {
                    text: response.text(),
                    steps,
                    trace,
                });
            }

            // Tools run one at a time, in the order the model asked for them
            let mut tool_message = Message::tool();
            for request in requests {
                match &request.tool_call {
                    Ok(call) => {
                        tracing::info!(tool = %call.name, arguments = %call.arguments, "calling tool");
                        let output = self.toolbox.dispatch(call.clone()).await;
                        if let Err(e) = &output {
                            tracing::warn!(tool = %call.name, error = %e, "tool call failed");
                        }
                        tool_message = tool_message.with_tool_response(request.id.clone(), output);
                    }
                    Err(e) => {
                        // Already reported back to the model alongside its request
                        tracing::warn!(id = %request.id, error = %e, "model made an invalid tool request");
                    }
                }
            }

            if !tool_message.content.is_empty() {
                messages.push(tool_message.clone());
                trace.push(tool_message);
            }
        }
    }

    async fn reply(&self, history: &[Message]) -> Result<String> {
        let generation = self.run(history).await?;
        let text = to_slack_mrkdwn(&generation.text);
        if text.is_empty() {
            return Err(AgentError::EmptyResponse.into());
        }
        tracing::info!(steps = generation.steps, response = %text, "generated response");
        Ok(text)
    }

    /// Produce the formatted reply for a conversation. Never fails: any error is
    /// logged and replaced with [`APOLOGY`]. The final text is also pushed to `status`.
    pub async fn generate(&self, history: &[Message], status: Option<&dyn StatusSink>) -> String {
        let reply = match self.reply(history).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "failed to generate a response");
                APOLOGY.to_string()
            }
        };

        if let Some(sink) = status {
            sink.update(&reply).await;
        }

        reply
    }
}
