use crate::slack::{SlackError, SlackMessage, SuggestedPrompt, ThreadStatus};
use crate::state::AppState;
use gull::agent::StatusSink;
use gull::models::message::Message;
use serde::Deserialize;
use serde_json::{json, Value};

pub const GREETING: &str = "Hello, I'm an AI assistant! How can I help?";
pub const THINKING: &str = "is thinking...";
pub const BLANK_REPLY_FALLBACK: &str = "Sorry, I couldn't generate a response.";
pub const INTAKE_ERROR: &str = "An error occurred while processing your request.";

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantThread {
    pub channel_id: String,
    pub thread_ts: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantThreadStarted {
    pub assistant_thread: AssistantThread,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEvent {
    pub channel: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub bot_profile: Option<Value>,
}

impl MessageEvent {
    /// The thread to answer in, if this message deserves an answer at all
    pub fn reply_thread(&self, bot_user_id: &str) -> Option<&str> {
        let from_bot = self.bot_id.is_some()
            || self.bot_profile.is_some()
            || self.user.as_deref() == Some(bot_user_id);
        if from_bot || self.subtype.is_some() {
            return None;
        }
        self.thread_ts.as_deref()
    }
}

pub fn suggested_prompts() -> Vec<SuggestedPrompt> {
    vec![
        SuggestedPrompt::new("Get the weather", "What is the current weather in London?"),
        SuggestedPrompt::new(
            "Get the news",
            "What is the latest Premier League news from the BBC?",
        ),
    ]
}

/// Turn a Slack thread into conversation history. Bot messages become assistant
/// turns, everything else a user turn; mentions of the bot are stripped.
pub fn thread_history(replies: &[SlackMessage], bot_user_id: &str) -> Vec<Message> {
    let mention = format!("<@{}>", bot_user_id);
    replies
        .iter()
        .filter_map(|reply| {
            let text = reply.text.as_deref()?.replace(&mention, "");
            let text = text.trim();
            if text.is_empty() {
                return None;
            }

            let from_bot =
                reply.bot_id.is_some() || reply.user.as_deref() == Some(bot_user_id);
            let message = if from_bot {
                Message::assistant()
            } else {
                Message::user()
            };
            Some(message.with_text(text))
        })
        .collect()
}

/// The threaded reply: plain text fallback plus a single mrkdwn section
pub fn reply_payload(channel: &str, thread_ts: &str, reply: &str) -> Value {
    let text = match reply.trim() {
        "" => BLANK_REPLY_FALLBACK,
        trimmed => trimmed,
    };
    json!({
        "channel": channel,
        "thread_ts": thread_ts,
        "text": text,
        "unfurl_links": false,
        "blocks": [{
            "type": "section",
            "text": {"type": "mrkdwn", "text": text}
        }]
    })
}

pub async fn assistant_thread_started(
    state: &AppState,
    event: &AssistantThreadStarted,
) -> Result<(), SlackError> {
    let AssistantThread {
        channel_id,
        thread_ts,
    } = &event.assistant_thread;
    tracing::info!(channel = %channel_id, thread_ts = %thread_ts, "assistant thread started");

    state.slack.post_text(channel_id, thread_ts, GREETING).await?;
    state
        .slack
        .set_suggested_prompts(channel_id, thread_ts, &suggested_prompts())
        .await
}

/// Answer a message in an assistant thread. Failures are reported into the thread.
pub async fn assistant_message(state: &AppState, event: &MessageEvent) {
    let Some(thread_ts) = event.reply_thread(&state.bot_user_id) else {
        tracing::debug!(channel = %event.channel, "ignoring message");
        return;
    };
    let channel = event.channel.as_str();
    let status = ThreadStatus::new(state.slack.clone(), channel, thread_ts);

    if let Err(e) = respond(state, &status, channel, thread_ts).await {
        tracing::error!(channel, thread_ts, error = %e, "error handling assistant message");

        if let Err(e) = state.slack.post_text(channel, thread_ts, INTAKE_ERROR).await {
            tracing::error!(error = %e, "failed to report error to thread");
        }
        if let Err(e) = status.clear().await {
            tracing::warn!(error = %e, "failed to clear thread status");
        }
    }
}

async fn respond(
    state: &AppState,
    status: &ThreadStatus,
    channel: &str,
    thread_ts: &str,
) -> Result<(), SlackError> {
    status.set(THINKING).await?;

    let replies = state.slack.conversation_replies(channel, thread_ts).await?;
    let history = thread_history(&replies, &state.bot_user_id);

    let sink: &dyn StatusSink = status;
    let reply = state.agent.generate(&history, Some(sink)).await;

    state
        .slack
        .post_message(&reply_payload(channel, thread_ts, &reply))
        .await?;
    status.clear().await
}
