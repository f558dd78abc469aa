use crate::handlers::{self, AssistantThreadStarted, MessageEvent};
use crate::signature::verify_slack_signature;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

// Outer payload of the Events API
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    UrlVerification {
        challenge: String,
    },
    EventCallback {
        event: Value,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SlackEvent {
    AssistantThreadStarted(AssistantThreadStarted),
    Message(MessageEvent),
    #[serde(other)]
    Other,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

async fn slack_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(secret) = &state.signing_secret {
        let timestamp = header_str(&headers, "x-slack-request-timestamp");
        let signature = header_str(&headers, "x-slack-signature");
        if !verify_slack_signature(secret, timestamp, &body, signature, Utc::now().timestamp()) {
            tracing::warn!("Slack signature verification failed");
            return (StatusCode::UNAUTHORIZED, "invalid signature").into_response();
        }
    }

    // Slack retries anything not acknowledged within 3 seconds, the first delivery is already being handled
    if let Some(retry) = headers.get("x-slack-retry-num") {
        tracing::info!(retry = ?retry, "ignoring Slack retry");
        return StatusCode::OK.into_response();
    }

    let envelope: Envelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, "invalid Slack payload");
            return (StatusCode::BAD_REQUEST, "invalid payload").into_response();
        }
    };

    match envelope {
        Envelope::UrlVerification { challenge } => challenge.into_response(),
        Envelope::EventCallback { event } => {
            tokio::spawn(dispatch(state, event));
            StatusCode::OK.into_response()
        }
        Envelope::Unsupported => StatusCode::OK.into_response(),
    }
}

async fn dispatch(state: AppState, event: Value) {
    match serde_json::from_value::<SlackEvent>(event) {
        Ok(SlackEvent::AssistantThreadStarted(event)) => {
            if let Err(e) = handlers::assistant_thread_started(&state, &event).await {
                tracing::error!(error = %e, "failed to set up assistant thread");
            }
        }
        Ok(SlackEvent::Message(event)) => handlers::assistant_message(&state, &event).await,
        Ok(SlackEvent::Other) => tracing::debug!("ignoring unsupported event"),
        Err(e) => tracing::warn!(error = %e, "could not decode Slack event"),
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/slack/events", post(slack_events))
        .with_state(state)
}
