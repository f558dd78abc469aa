pub const DEEPSEEK_HOST: &str = "https://api.deepseek.com";
pub const DEEPSEEK_MODEL: &str = "deepseek-chat";

/// Connection settings for an OpenAI-compatible chat completions backend
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl OpenAiProviderConfig {
    /// A DeepSeek config with default model settings
    pub fn deepseek<S: Into<String>>(api_key: S) -> Self {
        Self {
            host: DEEPSEEK_HOST.to_string(),
            api_key: api_key.into(),
            model: DEEPSEEK_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}
