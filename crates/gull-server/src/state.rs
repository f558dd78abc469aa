use crate::configuration::Settings;
use crate::slack::SlackClient;
use anyhow::Result;
use gull::agent::Agent;
use gull::providers::openai::OpenAiProvider;
use gull::tools::assistant_toolbox;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<Agent>,
    pub slack: Arc<SlackClient>,
    pub bot_user_id: String,
    /// Request signatures are verified only when present
    pub signing_secret: Option<String>,
}

impl AppState {
    /// Build the agent and Slack client, resolving the bot user id with `auth.test`
    pub async fn from_settings(settings: Settings) -> Result<Self> {
        let provider = OpenAiProvider::new(settings.provider.into_config())?;
        let toolbox = assistant_toolbox(settings.search.into_config(), &settings.weather.host)?;
        let agent = Agent::new(Box::new(provider), toolbox);

        let slack = SlackClient::new(settings.slack.host, settings.slack.bot_token)?;
        let bot_user_id = slack.auth_test().await?;
        tracing::info!(bot_user_id = %bot_user_id, "resolved bot user");

        let signing_secret = Some(settings.slack.signing_secret).filter(|s| !s.is_empty());
        if signing_secret.is_none() {
            tracing::warn!("no signing secret configured, Slack requests are not verified");
        }

        Ok(Self {
            agent: Arc::new(agent),
            slack: Arc::new(slack),
            bot_user_id,
            signing_secret,
        })
    }
}
