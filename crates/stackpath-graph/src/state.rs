use serde::{Deserialize, Serialize};
use std::time::Duration;

use stackpath_llm::AgentMessage;
use stackpath_types::{MessageContent, ToolCall};

/// Shared message-list state flowing through the graph nodes.
#[derive(Debug, Clone)]
pub struct GraphState {
    pub thread_id: String,
    pub run_id: String,
    pub messages: Vec<AgentMessage>,
    pub model: String,
    pub approve_all_tools: bool,
}

impl GraphState {
    pub fn new(thread_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: uuid::Uuid::new_v4().to_string(),
            messages: Vec::new(),
            model: model.into(),
            approve_all_tools: false,
        }
    }

    pub fn last_message(&self) -> Option<&AgentMessage> {
        self.messages.last()
    }

    pub fn add_message(&mut self, message: AgentMessage) {
        self.messages.push(message);
    }

    pub fn has_pending_tool_calls(&self) -> bool {
        !self.pending_tool_calls().is_empty()
    }

    pub fn pending_tool_calls(&self) -> Vec<ToolCall> {
        match self.last_message() {
            Some(AgentMessage::AI {
                tool_calls: Some(calls),
                ..
            }) => calls.clone(),
            _ => Vec::new(),
        }
    }

    /// Replace a pending tool call in place, matched by id.
    pub fn update_pending_tool_call(&mut self, updated: ToolCall) -> bool {
        if let Some(AgentMessage::AI {
            tool_calls: Some(calls),
            ..
        }) = self.messages.last_mut()
        {
            if let Some(slot) = calls.iter_mut().find(|c| c.id == updated.id) {
                *slot = updated;
                return true;
            }
        }
        false
    }

    pub fn add_tool_result(&mut self, tool_call_id: String, result: impl Into<MessageContent>) {
        self.messages
            .push(AgentMessage::tool_result(tool_call_id, result));
    }
}

/// Input for one turn: either a fresh user message or a resume decision
/// for a turn previously suspended at the approval gate.
#[derive(Debug, Clone)]
pub struct TurnInput {
    pub thread_id: String,
    pub model: String,
    pub approve_all_tools: bool,
    pub kind: TurnKind,
}

#[derive(Debug, Clone)]
pub enum TurnKind {
    Message(MessageContent),
    Resume(ResumeAction),
}

impl TurnInput {
    pub fn message(
        thread_id: impl Into<String>,
        model: impl Into<String>,
        content: impl Into<MessageContent>,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            model: model.into(),
            approve_all_tools: false,
            kind: TurnKind::Message(content.into()),
        }
    }

    pub fn resume(
        thread_id: impl Into<String>,
        model: impl Into<String>,
        action: ResumeAction,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            model: model.into(),
            approve_all_tools: false,
            kind: TurnKind::Resume(action),
        }
    }

    pub fn with_approve_all_tools(mut self, approve: bool) -> Self {
        self.approve_all_tools = approve;
        self
    }
}

/// External decision resuming a suspended turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "snake_case")]
pub enum ResumeAction {
    /// Proceed to tool execution unmodified.
    Continue,

    /// Proceed with a modified tool-call payload.
    Update { tool_call: ToolCall },

    /// Skip execution; record a denial tool-result and return to the model.
    Feedback { message: String },
}

#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub max_iterations: usize,
    pub execution_timeout: Duration,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            execution_timeout: Duration::from_secs(300),
        }
    }
}

impl GraphConfig {
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.execution_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pending_tool_calls_come_from_last_ai_message() {
        let mut state = GraphState::new("T1", "gpt-4o");
        assert!(!state.has_pending_tool_calls());

        state.add_message(AgentMessage::ai_with_tools(
            None,
            vec![ToolCall::new("call_1", "search", json!({}))],
        ));
        assert!(state.has_pending_tool_calls());

        state.add_tool_result("call_1".to_string(), "done");
        assert!(!state.has_pending_tool_calls());
    }

    #[test]
    fn update_pending_tool_call_replaces_by_id() {
        let mut state = GraphState::new("T1", "gpt-4o");
        state.add_message(AgentMessage::ai_with_tools(
            None,
            vec![ToolCall::new("call_1", "search", json!({"q": "a"}))],
        ));

        let updated = ToolCall::new("call_1", "search", json!({"q": "b"}));
        assert!(state.update_pending_tool_call(updated.clone()));
        assert_eq!(state.pending_tool_calls(), vec![updated]);

        assert!(!state.update_pending_tool_call(ToolCall::new("call_9", "x", json!({}))));
    }
}
