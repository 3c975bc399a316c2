use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;

use stackpath_llm::{AgentMessage, ChatClient, ChatOptions, ChatRequest, LlmEvent};
use stackpath_mcp::ToolExecutor;
use stackpath_types::{MessageContent, ToolCall};

use crate::events::GraphEvent;
use crate::node::{EventSender, Node, NodeType};
use crate::state::GraphState;

/// Model-call node: streams one completion over the current message list
/// with the merged tool set bound, forwarding text deltas as it goes.
pub struct AgentNode {
    client: Arc<dyn ChatClient>,
    executor: Arc<ToolExecutor>,
}

impl AgentNode {
    pub fn new(client: Arc<dyn ChatClient>, executor: Arc<ToolExecutor>) -> Self {
        Self { client, executor }
    }
}

#[async_trait]
impl Node for AgentNode {
    async fn execute(&self, state: &mut GraphState, event_tx: EventSender) -> Result<()> {
        let tools = self.executor.llm_tools().await;

        let request = ChatRequest::new(state.model.clone(), state.messages.clone())
            .with_options(ChatOptions::new().tools(tools));

        let mut stream = self.client.chat_stream(request).await?;

        // One logical assistant message per invocation: every text delta
        // this node emits reuses this id so the client can append.
        let message_id = format!("msg_{}", uuid::Uuid::new_v4());

        let mut text = String::new();
        // index -> (id, name, accumulated argument fragments)
        let mut call_buffers: HashMap<u32, (Option<String>, Option<String>, String)> =
            HashMap::new();
        let mut order: Vec<u32> = Vec::new();

        while let Some(event_result) = stream.next().await {
            match event_result? {
                LlmEvent::Message { content } => {
                    if !content.is_empty() {
                        text.push_str(&content);
                        event_tx
                            .send(GraphEvent::Message {
                                id: message_id.clone(),
                                content,
                            })
                            .await?;
                    }
                }
                LlmEvent::ToolCall {
                    index,
                    id,
                    name,
                    arguments,
                } => {
                    if !call_buffers.contains_key(&index) {
                        order.push(index);
                    }
                    let entry = call_buffers.entry(index).or_default();
                    if let Some(id) = id {
                        entry.0 = Some(id);
                    }
                    if let Some(name) = name {
                        entry.1 = Some(name);
                    }
                    if let Some(args) = arguments {
                        entry.2.push_str(&args);
                    }
                }
                LlmEvent::Done { .. } => {}
            }
        }

        let tool_calls: Vec<ToolCall> = order
            .into_iter()
            .filter_map(|index| call_buffers.remove(&index))
            .filter_map(|(id, name, arguments)| {
                let (id, name) = (id?, name?);
                let args = serde_json::from_str(&arguments)
                    .unwrap_or(serde_json::Value::String(arguments));
                Some(ToolCall::new(id, name, args))
            })
            .collect();

        if !tool_calls.is_empty() {
            event_tx
                .send(GraphEvent::ToolCallMessage {
                    id: message_id.clone(),
                    tool_calls: tool_calls.clone(),
                    response_metadata: None,
                })
                .await?;
        }

        let content = if text.is_empty() {
            None
        } else {
            Some(MessageContent::Text(text))
        };
        let tool_calls = if tool_calls.is_empty() {
            None
        } else {
            Some(tool_calls)
        };

        state.add_message(AgentMessage::AI {
            content,
            tool_calls,
            response_metadata: None,
        });

        Ok(())
    }

    fn node_type(&self) -> NodeType {
        NodeType::Agent
    }
}
