use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool call attached to an `ai` message.
///
/// Arguments stay a raw JSON value so they survive hydration and
/// delta emission byte-for-byte.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }
}
