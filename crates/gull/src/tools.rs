mod handler;
mod toolbox;
pub mod weather;
pub mod web_sources;

pub use handler::ToolHandler;
pub use toolbox::Toolbox;

use anyhow::Result;

use weather::{WeatherClient, WeatherTool};
use web_sources::{SearchConfig, TavilyClient, WebSourcesTool};

/// The toolbox the assistant runs with: web search and current weather
pub fn assistant_toolbox(search: SearchConfig, weather_host: &str) -> Result<Toolbox> {
    let mut toolbox = Toolbox::new();
    toolbox.add(Box::new(WebSourcesTool::new(TavilyClient::new(search)?)))?;
    toolbox.add(Box::new(WeatherTool::new(WeatherClient::new(weather_host)?)))?;
    Ok(toolbox)
}
