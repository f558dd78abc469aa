use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::Tool;

/// A capability the model can invoke by name
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The descriptor sent to the model: name, description and argument schema
    fn tool(&self) -> &Tool;

    /// Execute the tool with the arguments the model supplied
    async fn call(&self, arguments: Value) -> AgentResult<Value>;
}

/// Decode the model's arguments into a typed parameter struct
pub(crate) fn parse_arguments<T: DeserializeOwned>(tool: &str, arguments: Value) -> AgentResult<T> {
    serde_json::from_value(arguments)
        .map_err(|e| AgentError::InvalidParameters(format!("{}: {}", tool, e)))
}
