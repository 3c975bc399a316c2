use crate::node::NodeType;
use crate::state::GraphState;

/// Decides which node runs next based on the current state.
pub trait Router: Send + Sync {
    fn next(&self, state: &GraphState, current: NodeType) -> NextNode;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextNode {
    Agent,
    ToolApproval,
    Tools,
    End,
}

/// Gated react loop:
/// agent -> tool_approval (tool calls, approval required)
/// agent -> tools         (tool calls, approve-all set)
/// agent -> END           (no tool calls)
/// tool_approval -> tools, tools -> agent
pub struct ApprovalRouter;

impl Router for ApprovalRouter {
    fn next(&self, state: &GraphState, current: NodeType) -> NextNode {
        match current {
            NodeType::Agent => {
                if !state.has_pending_tool_calls() {
                    NextNode::End
                } else if state.approve_all_tools {
                    NextNode::Tools
                } else {
                    NextNode::ToolApproval
                }
            }
            NodeType::ToolApproval => NextNode::Tools,
            NodeType::Tools => NextNode::Agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stackpath_llm::AgentMessage;
    use stackpath_types::ToolCall;

    fn state_with_calls(approve_all: bool) -> GraphState {
        let mut state = GraphState::new("T1", "gpt-4o");
        state.approve_all_tools = approve_all;
        state.add_message(AgentMessage::ai_with_tools(
            None,
            vec![ToolCall::new("call_1", "search", json!({}))],
        ));
        state
    }

    #[test]
    fn agent_with_tool_calls_routes_to_approval_gate() {
        let state = state_with_calls(false);
        assert_eq!(
            ApprovalRouter.next(&state, NodeType::Agent),
            NextNode::ToolApproval
        );
    }

    #[test]
    fn approve_all_bypasses_the_gate() {
        let state = state_with_calls(true);
        assert_eq!(ApprovalRouter.next(&state, NodeType::Agent), NextNode::Tools);
    }

    #[test]
    fn agent_without_tool_calls_ends_the_turn() {
        let mut state = GraphState::new("T1", "gpt-4o");
        state.add_message(AgentMessage::ai("all done"));
        assert_eq!(ApprovalRouter.next(&state, NodeType::Agent), NextNode::End);
    }

    #[test]
    fn tools_always_return_to_agent() {
        let state = state_with_calls(false);
        assert_eq!(ApprovalRouter.next(&state, NodeType::Tools), NextNode::Agent);
    }
}
