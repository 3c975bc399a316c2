use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use stackpath_mcp::ToolExecutor;

use crate::events::GraphEvent;
use crate::node::{EventSender, Node, NodeType};
use crate::state::GraphState;

/// Executes every approved pending call and appends the results as
/// tool messages. Tool failures are resilient: the error text becomes
/// the result so the model can react to it.
pub struct ToolsNode {
    executor: Arc<ToolExecutor>,
}

impl ToolsNode {
    pub fn new(executor: Arc<ToolExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Node for ToolsNode {
    async fn execute(&self, state: &mut GraphState, event_tx: EventSender) -> Result<()> {
        let tool_calls = state.pending_tool_calls();

        for tool_call in tool_calls {
            let (content, is_error) = match self
                .executor
                .execute(&tool_call.name, tool_call.args.clone())
                .await
            {
                Ok(result) => (result, false),
                Err(e) => {
                    tracing::warn!(tool = %tool_call.name, error = %e, "Tool execution failed");
                    (format!("Tool execution failed: {}", e), true)
                }
            };

            event_tx
                .send(GraphEvent::ToolResult {
                    id: format!("tool_{}", uuid::Uuid::new_v4()),
                    tool_call_id: tool_call.id.clone(),
                    content: content.clone(),
                    is_error,
                })
                .await?;

            state.add_tool_result(tool_call.id, content);
        }

        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::Tools
    }
}
