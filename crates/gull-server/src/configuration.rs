use crate::error::ConfigError;
use config::{Config, Environment, File};
use gull::providers::configs::{OpenAiProviderConfig, DEEPSEEK_HOST, DEEPSEEK_MODEL};
use gull::tools::weather::OPEN_METEO_HOST;
use gull::tools::web_sources::{SearchConfig, TAVILY_HOST};
use serde::Deserialize;
use std::env;
use std::net::SocketAddr;

pub const SLACK_API_HOST: &str = "https://slack.com/api";

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

/// The chat completions backend
#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_host")]
    pub host: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl ProviderSettings {
    pub fn into_config(self) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            host: self.host,
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_search_host")]
    pub host: String,
    #[serde(default)]
    pub api_key: String,
}

impl SearchSettings {
    pub fn into_config(self) -> SearchConfig {
        SearchConfig {
            host: self.host,
            api_key: self.api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WeatherSettings {
    #[serde(default = "default_weather_host")]
    pub host: String,
}

#[derive(Debug, Deserialize)]
pub struct SlackSettings {
    #[serde(default = "default_slack_host")]
    pub host: String,
    #[serde(default)]
    pub bot_token: String,
    /// Request signatures are only checked when this is set
    #[serde(default)]
    pub signing_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub search: SearchSettings,
    pub weather: WeatherSettings,
    pub slack: SlackSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Service defaults, credentials fall back to their conventional variables
            .set_default("provider.host", default_provider_host())?
            .set_default("provider.model", default_model())?
            .set_default("provider.api_key", legacy_env("DEEPSEEK_API_KEY"))?
            .set_default("search.host", default_search_host())?
            .set_default("search.api_key", legacy_env("TAVILY_API_KEY"))?
            .set_default("weather.host", default_weather_host())?
            .set_default("slack.host", default_slack_host())?
            .set_default("slack.bot_token", legacy_env("SLACK_BOT_TOKEN"))?
            .set_default("slack.signing_secret", legacy_env("SLACK_SIGNING_SECRET"))?
            .add_source(File::with_name("gull").required(false))
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("GULL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Every field has a default, so only malformed values can fail here
        config.try_deserialize().map_err(ConfigError::Other)
    }
}

// A missing credential is an empty key, the service rejects it at request time
fn legacy_env(key: &str) -> String {
    env::var(key).unwrap_or_default()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_provider_host() -> String {
    DEEPSEEK_HOST.to_string()
}

fn default_model() -> String {
    DEEPSEEK_MODEL.to_string()
}

fn default_search_host() -> String {
    TAVILY_HOST.to_string()
}

fn default_weather_host() -> String {
    OPEN_METEO_HOST.to_string()
}

fn default_slack_host() -> String {
    SLACK_API_HOST.to_string()
}
