use super::role::Role;
use super::tool::ToolCall;
use crate::errors::{AgentError, AgentResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub tool_call: AgentResult<ToolCall>,
    /// The call exactly as the model sent it, kept when it could not be decoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_call: Option<RawToolCall>,
}

/// An undecoded tool call: the name and the argument string as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawToolCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub id: String,
    pub tool_result: AgentResult<Value>,
}

impl ToolResponse {
    /// The text the model sees for this response. Plain strings are passed as-is,
    /// structured values are sent as compact json.
    pub fn output_text(&self) -> AgentResult<String> {
        match &self.tool_result {
            Ok(Value::String(text)) => Ok(text.clone()),
            Ok(value) => Ok(value.to_string()),
            Err(e) => Err(e.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Content passed inside a message, which can be both simple text and tool content
pub enum MessageContent {
    Text(TextContent),
    ToolRequest(ToolRequest),
    ToolResponse(ToolResponse),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text(TextContent { text: text.into() })
    }

    pub fn tool_request<S: Into<String>>(id: S, tool_call: AgentResult<ToolCall>) -> Self {
        MessageContent::ToolRequest(ToolRequest {
            id: id.into(),
            tool_call,
            raw_call: None,
        })
    }

    /// A tool request the model made but that could not be decoded
    pub fn invalid_tool_request<S: Into<String>>(
        id: S,
        raw_call: RawToolCall,
        error: AgentError,
    ) -> Self {
        MessageContent::ToolRequest(ToolRequest {
            id: id.into(),
            tool_call: Err(error),
            raw_call: Some(raw_call),
        })
    }

    pub fn tool_response<S: Into<String>>(id: S, tool_result: AgentResult<Value>) -> Self {
        MessageContent::ToolResponse(ToolResponse {
            id: id.into(),
            tool_result,
        })
    }

    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        if let MessageContent::ToolRequest(ref tool_request) = self {
            Some(tool_request)
        } else {
            None
        }
    }

    pub fn as_tool_response(&self) -> Option<&ToolResponse> {
        if let MessageContent::ToolResponse(ref tool_response) = self {
            Some(tool_response)
        } else {
            None
        }
    }

    /// Get the text content if this is a TextContent variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(&text.text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Vec<MessageContent>,
}

impl Message {
    fn new(role: Role) -> Self {
        Message {
            role,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Create a new user message with the current timestamp
    pub fn user() -> Self {
        Self::new(Role::User)
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant() -> Self {
        Self::new(Role::Assistant)
    }

    /// Create a new message carrying tool results back to the model
    pub fn tool() -> Self {
        Self::new(Role::Tool)
    }

    /// Add any MessageContent to the message
    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    /// Add a tool request to the message
    pub fn with_tool_request<S: Into<String>>(
        self,
        id: S,
        tool_call: AgentResult<ToolCall>,
    ) -> Self {
        self.with_content(MessageContent::tool_request(id, tool_call))
    }

    /// Add a tool response to the message
    pub fn with_tool_response<S: Into<String>>(self, id: S, result: AgentResult<Value>) -> Self {
        self.with_content(MessageContent::tool_response(id, result))
    }

    /// All text content in the message, joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| c.as_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The tool requests carried by this message, in the order the model made them
    pub fn tool_requests(&self) -> Vec<&ToolRequest> {
        self.content
            .iter()
            .filter_map(|c| c.as_tool_request())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_joins_text_content_only() {
        let message = Message::assistant()
            .with_text("first")
            .with_tool_request("1", Ok(ToolCall::new("webSources", json!({"query": "x"}))))
            .with_text("second");

        assert_eq!(message.text(), "first\nsecond");
        assert_eq!(message.tool_requests().len(), 1);
    }

    #[test]
    fn test_tool_response_output_text() {
        let text = ToolResponse {
            id: "1".to_string(),
            tool_result: Ok(json!("plain text")),
        };
        assert_eq!(text.output_text(), Ok("plain text".to_string()));

        let structured = ToolResponse {
            id: "2".to_string(),
            tool_result: Ok(json!({"city": "London"})),
        };
        assert_eq!(structured.output_text(), Ok(r#"{"city":"London"}"#.to_string()));

        let failed = ToolResponse {
            id: "3".to_string(),
            tool_result: Err(AgentError::ExecutionError("boom".to_string())),
        };
        assert!(failed.output_text().is_err());
    }

    #[test]
    fn test_role_serialization() {
        let message = Message::tool().with_tool_response("1", Ok(json!("done")));
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "tool");
    }
}
