use anyhow::{anyhow, Result};
use serde_json::Value;

use super::ToolHandler;
use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};

/// Registry of the tools offered to the model, keyed by tool name
#[derive(Default)]
pub struct Toolbox {
    handlers: Vec<Box<dyn ToolHandler>>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Names must be unique since the model calls tools by name.
    pub fn add(&mut self, handler: Box<dyn ToolHandler>) -> Result<()> {
        let name = &handler.tool().name;
        if self.get(name).is_some() {
            return Err(anyhow!("Duplicate tool name: {}", name));
        }
        self.handlers.push(handler);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn ToolHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.tool().name == name)
            .map(|handler| &**handler)
    }

    /// Descriptors for every registered tool, in registration order
    pub fn tools(&self) -> Vec<Tool> {
        self.handlers.iter().map(|h| h.tool().clone()).collect()
    }

    /// Route a tool call to the handler registered under its name
    pub async fn dispatch(&self, call: ToolCall) -> AgentResult<Value> {
        let handler = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;
        handler.call(call.arguments).await
    }
}
