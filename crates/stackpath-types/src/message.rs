use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::MessageContent;
use crate::tool::ToolCall;

/// Client-facing message, wire-encoded as `{"type": ..., "data": {...}}`.
///
/// Closed sum over the four message kinds; every consumption site
/// (hydration, delta reconciliation, persistence) matches exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ChatMessage {
    Human(HumanData),
    Ai(AiData),
    Tool(ToolData),
    Error(ErrorData),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HumanData {
    pub id: String,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiData {
    pub id: String,
    pub content: MessageContent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    /// Provider-specific metadata bag, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolData {
    pub id: String,
    pub content: MessageContent,
    pub tool_call_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorData {
    pub id: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn human(id: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self::Human(HumanData {
            id: id.into(),
            content: content.into(),
        })
    }

    pub fn ai(id: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self::Ai(AiData {
            id: id.into(),
            content: content.into(),
            tool_calls: None,
            response_metadata: None,
        })
    }

    pub fn ai_with_tools(id: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Ai(AiData {
            id: id.into(),
            content: MessageContent::text(""),
            tool_calls: Some(tool_calls),
            response_metadata: None,
        })
    }

    pub fn tool(
        id: impl Into<String>,
        tool_call_id: impl Into<String>,
        content: impl Into<MessageContent>,
    ) -> Self {
        Self::Tool(ToolData {
            id: id.into(),
            content: content.into(),
            tool_call_id: tool_call_id.into(),
            name: None,
        })
    }

    pub fn error(id: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self::Error(ErrorData {
            id: id.into(),
            content: content.into(),
        })
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Human(d) => &d.id,
            Self::Ai(d) => &d.id,
            Self::Tool(d) => &d.id,
            Self::Error(d) => &d.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Human(_) => "human",
            Self::Ai(_) => "ai",
            Self::Tool(_) => "tool",
            Self::Error(_) => "error",
        }
    }
}

/// Client-held thread metadata. The server never persists this.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Thread {
    pub fn new(title: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
