use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};
use std::time::Duration;

use super::handler::{parse_arguments, ToolHandler};
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;

pub const OPEN_METEO_HOST: &str = "https://api.open-meteo.com";

/// Reported to the model when the weather provider cannot be reached
pub const WEATHER_APOLOGY: &str = "Sorry, I couldn't retrieve the weather at this time.";

const CURRENT_FIELDS: &str = "temperature_2m,weathercode,relativehumidity_2m";

/// Current conditions exactly as the provider reported them
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentConditions {
    pub temperature_2m: Number,
    pub weathercode: Number,
    pub relativehumidity_2m: Number,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

/// The tool output handed back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temperature: Number,
    pub weather_code: Number,
    pub humidity: Number,
    pub city: String,
}

impl CurrentWeather {
    pub fn new(conditions: CurrentConditions, city: String) -> Self {
        Self {
            temperature: conditions.temperature_2m,
            weather_code: conditions.weathercode,
            humidity: conditions.relativehumidity_2m,
            city,
        }
    }
}

/// Client for the Open-Meteo forecast API
pub struct WeatherClient {
    client: Client,
    host: String,
}

impl WeatherClient {
    pub fn new<S: Into<String>>(host: S) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            host: host.into(),
        })
    }

    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions> {
        let url = format!("{}/v1/forecast", self.host.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let forecast: ForecastResponse = response.json().await?;
        Ok(forecast.current)
    }

    /// Current weather labelled with the caller's city name
    pub async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
        city: String,
    ) -> Result<CurrentWeather> {
        let conditions = self.current(latitude, longitude).await?;
        Ok(CurrentWeather::new(conditions, city))
    }
}

#[derive(Debug, Deserialize)]
struct WeatherParams {
    latitude: f64,
    longitude: f64,
    city: String,
}

/// The `getWeather` tool
pub struct WeatherTool {
    tool: Tool,
    client: WeatherClient,
}

impl WeatherTool {
    pub fn new(client: WeatherClient) -> Self {
        let tool = Tool::new(
            "getWeather",
            "Get the current weather at a location",
            json!({
                "type": "object",
                "required": ["latitude", "longitude", "city"],
                "properties": {
                    "latitude": {"type": "number"},
                    "longitude": {"type": "number"},
                    "city": {"type": "string"}
                }
            }),
        );
        Self { tool, client }
    }
}

#[async_trait]
impl ToolHandler for WeatherTool {
    fn tool(&self) -> &Tool {
        &self.tool
    }

    async fn call(&self, arguments: Value) -> AgentResult<Value> {
        let params: WeatherParams = parse_arguments(&self.tool.name, arguments)?;
        let weather = self
            .client
            .current_weather(params.latitude, params.longitude, params.city)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "weather lookup failed");
                AgentError::ExecutionError(WEATHER_APOLOGY.to_string())
            })?;

        serde_json::to_value(weather).map_err(|e| AgentError::Internal(e.to_string()))
    }
}
