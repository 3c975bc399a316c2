use serde::{Deserialize, Serialize};
use serde_json::Value;

use stackpath_types::ToolCall;

/// Event stream produced by one turn of the graph.
///
/// `Message` deltas sharing an `id` belong to the same logical assistant
/// message; a new `id` starts a new one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphEvent {
    /// Assistant text fragment.
    Message { id: String, content: String },

    /// Assistant message carrying pending tool calls, emitted whole.
    ToolCallMessage {
        id: String,
        tool_calls: Vec<ToolCall>,
        #[serde(skip_serializing_if = "Option::is_none")]
        response_metadata: Option<Value>,
    },

    /// Result of one executed tool call.
    ToolResult {
        id: String,
        tool_call_id: String,
        content: String,
        is_error: bool,
    },

    /// Turn suspended at the approval gate; awaiting an external decision.
    Interrupt { tool_calls: Vec<ToolCall> },

    /// Turn completed.
    Done,

    /// Turn aborted.
    Error { message: String },
}
