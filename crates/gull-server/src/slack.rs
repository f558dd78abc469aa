use async_trait::async_trait;
use gull::agent::StatusSink;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlackError {
    #[error("Slack request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Slack API error in {method}: {error}")]
    Api { method: String, error: String },
    #[error("Unexpected Slack response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A message as returned by `conversations.replies`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackMessage {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthTest {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct Replies {
    #[serde(default)]
    messages: Vec<SlackMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedPrompt {
    pub title: String,
    pub message: String,
}

impl SuggestedPrompt {
    pub fn new<S: Into<String>>(title: S, message: S) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Minimal Slack Web API client, just the methods the assistant needs
pub struct SlackClient {
    client: Client,
    host: String,
    token: String,
}

impl SlackClient {
    pub fn new<S: Into<String>>(host: S, token: S) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            host: host.into(),
            token: token.into(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), method)
    }

    // Every Web API response carries `ok`, failures name the reason in `error`
    fn check<T: DeserializeOwned>(method: &str, body: Value) -> Result<T, SlackError> {
        if body.get("ok").and_then(Value::as_bool) != Some(true) {
            let error = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error")
                .to_string();
            return Err(SlackError::Api {
                method: method.to_string(),
                error,
            });
        }
        Ok(serde_json::from_value(body)?)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SlackError> {
        let body: Value = self
            .client
            .get(self.url(method))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Self::check(method, body)
    }

    async fn post(&self, method: &str, payload: &Value) -> Result<Value, SlackError> {
        let body: Value = self
            .client
            .post(self.url(method))
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Self::check(method, body)
    }

    /// The bot's own user id
    pub async fn auth_test(&self) -> Result<String, SlackError> {
        let auth: AuthTest = self.get("auth.test", &[]).await?;
        Ok(auth.user_id)
    }

    /// Every message of a thread, oldest first
    pub async fn conversation_replies(
        &self,
        channel: &str,
        thread_ts: &str,
    ) -> Result<Vec<SlackMessage>, SlackError> {
        let replies: Replies = self
            .get(
                "conversations.replies",
                &[("channel", channel), ("ts", thread_ts), ("limit", "50")],
            )
            .await?;
        Ok(replies.messages)
    }

    pub async fn post_message(&self, payload: &Value) -> Result<(), SlackError> {
        self.post("chat.postMessage", payload).await?;
        Ok(())
    }

    /// Post a plain text message into a thread
    pub async fn post_text(
        &self,
        channel: &str,
        thread_ts: &str,
        text: &str,
    ) -> Result<(), SlackError> {
        self.post_message(&json!({
            "channel": channel,
            "thread_ts": thread_ts,
            "text": text,
        }))
        .await
    }

    pub async fn set_status(
        &self,
        channel: &str,
        thread_ts: &str,
        status: &str,
    ) -> Result<(), SlackError> {
        self.post(
            "assistant.threads.setStatus",
            &json!({
                "channel_id": channel,
                "thread_ts": thread_ts,
                "status": status,
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn set_suggested_prompts(
        &self,
        channel: &str,
        thread_ts: &str,
        prompts: &[SuggestedPrompt],
    ) -> Result<(), SlackError> {
        self.post(
            "assistant.threads.setSuggestedPrompts",
            &json!({
                "channel_id": channel,
                "thread_ts": thread_ts,
                "prompts": prompts,
            }),
        )
        .await?;
        Ok(())
    }
}

/// Status updates shown under an assistant thread while a reply is generated
pub struct ThreadStatus {
    client: Arc<SlackClient>,
    channel: String,
    thread_ts: String,
}

impl ThreadStatus {
    pub fn new<S: Into<String>>(client: Arc<SlackClient>, channel: S, thread_ts: S) -> Self {
        Self {
            client,
            channel: channel.into(),
            thread_ts: thread_ts.into(),
        }
    }

    pub async fn set(&self, status: &str) -> Result<(), SlackError> {
        self.client
            .set_status(&self.channel, &self.thread_ts, status)
            .await
    }

    pub async fn clear(&self) -> Result<(), SlackError> {
        self.set("").await
    }
}

#[async_trait]
impl StatusSink for ThreadStatus {
    async fn update(&self, status: &str) {
        if let Err(e) = self.set(status).await {
            tracing::warn!(error = %e, "failed to update thread status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(mock_server: &MockServer) -> SlackClient {
        SlackClient::new(mock_server.uri(), "xoxb-test".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_auth_test() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth.test"))
            .and(header("Authorization", "Bearer xoxb-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "user_id": "UBOT",
                "bot_id": "B123"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server);
        assert_eq!(client.auth_test().await.unwrap(), "UBOT");
    }

    #[tokio::test]
    async fn test_conversation_replies() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conversations.replies"))
            .and(query_param("channel", "D1"))
            .and(query_param("ts", "100.1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "messages": [
                    {"user": "U1", "text": "hi", "ts": "100.1"},
                    {"user": "UBOT", "bot_id": "B123", "text": "hello", "ts": "100.2"}
                ],
                "has_more": false
            })))
            .mount(&mock_server)
            .await;

        let messages = client_for(&mock_server)
            .conversation_replies("D1", "100.1")
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].user.as_deref(), Some("U1"));
        assert_eq!(messages[1].bot_id.as_deref(), Some("B123"));
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": false, "error": "channel_not_found"})),
            )
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).post_text("C0", "1.0", "hi").await;
        match result {
            Err(SlackError::Api { method, error }) => {
                assert_eq!(method, "chat.postMessage");
                assert_eq!(error, "channel_not_found");
            }
            other => panic!("Expected an API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_thread_status_updates() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistant.threads.setStatus"))
            .and(body_json(json!({
                "channel_id": "D1",
                "thread_ts": "100.1",
                "status": "is thinking..."
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/assistant.threads.setStatus"))
            .and(body_json(json!({
                "channel_id": "D1",
                "thread_ts": "100.1",
                "status": ""
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let status = ThreadStatus::new(Arc::new(client_for(&mock_server)), "D1", "100.1");
        status.update("is thinking...").await;
        status.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_status_sink_swallows_failures() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assistant.threads.setStatus"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&mock_server)
            .await;

        let status = ThreadStatus::new(Arc::new(client_for(&mock_server)), "D1", "100.1");
        // Must not panic or propagate
        status.update("is thinking...").await;
        assert!(status.clear().await.is_err());
    }
}
