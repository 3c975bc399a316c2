use serde::{Deserialize, Serialize};
use serde_json::Value;

use stackpath_types::{MessageContent, ToolCall};

/// Internal message representation the agent graph and checkpoint hold.
///
/// Content reuses the client-side `MessageContent` so structured items
/// (images, file references) survive hydration without loss.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum AgentMessage {
    System {
        content: MessageContent,
    },

    #[serde(rename = "user")]
    Human {
        content: MessageContent,
    },

    #[serde(rename = "assistant")]
    AI {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<MessageContent>,

        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,

        #[serde(skip_serializing_if = "Option::is_none")]
        response_metadata: Option<Value>,
    },

    Tool {
        tool_call_id: String,
        content: MessageContent,
    },
}

impl AgentMessage {
    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<MessageContent>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<MessageContent>) -> Self {
        Self::AI {
            content: Some(content.into()),
            tool_calls: None,
            response_metadata: None,
        }
    }

    pub fn ai_with_tools(content: Option<MessageContent>, tool_calls: Vec<ToolCall>) -> Self {
        Self::AI {
            content,
            tool_calls: Some(tool_calls),
            response_metadata: None,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::Human { .. } => "user",
            Self::AI { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match self {
            Self::AI {
                tool_calls: Some(calls),
                ..
            } => Some(calls),
            _ => None,
        }
    }
}

/// Tool definition sent to the model (JSON Schema parameters).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            parameters,
        }
    }
}
