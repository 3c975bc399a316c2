use anyhow::{bail, Result};
use std::sync::Arc;
use tokio::sync::mpsc;

use stackpath_llm::{AgentMessage, ChatClient};
use stackpath_mcp::ToolExecutor;
use stackpath_memory::CheckpointStore;

use crate::builder::GraphBuilder;
use crate::events::GraphEvent;
use crate::node::{Node, NodeType};
use crate::nodes::{AgentNode, ToolsNode};
use crate::router::{ApprovalRouter, NextNode, Router};
use crate::state::{GraphConfig, GraphState, ResumeAction, TurnInput, TurnKind};

/// Compiled three-node state machine:
/// START -> agent -> {tool_approval | tools | END}, tool_approval -> tools,
/// tools -> agent. Reaching the approval gate suspends the turn with an
/// `Interrupt` event; resumption is a distinct `TurnKind::Resume` entry.
pub struct Graph {
    chat_client: Arc<dyn ChatClient>,
    tool_executor: Arc<ToolExecutor>,
    checkpoint_store: Arc<dyn CheckpointStore>,
    config: GraphConfig,
}

impl Graph {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        tool_executor: Arc<ToolExecutor>,
        checkpoint_store: Arc<dyn CheckpointStore>,
        config: GraphConfig,
    ) -> Self {
        Self {
            chat_client,
            tool_executor,
            checkpoint_store,
            config,
        }
    }

    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Drive one turn in a background task, returning the event receiver.
    /// Internal failures surface as a terminal `Error` event.
    pub fn spawn_turn(&self, input: TurnInput) -> mpsc::Receiver<GraphEvent> {
        let (tx, rx) = mpsc::channel(256);

        let chat_client = Arc::clone(&self.chat_client);
        let tool_executor = Arc::clone(&self.tool_executor);
        let checkpoint_store = Arc::clone(&self.checkpoint_store);
        let config = self.config.clone();

        tokio::spawn(async move {
            let timeout = config.execution_timeout;
            let run = Self::execute_turn(
                input,
                tx.clone(),
                chat_client,
                tool_executor,
                checkpoint_store,
                config,
            );

            let outcome = match tokio::time::timeout(timeout, run).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!(
                    "Turn exceeded execution timeout of {:?}",
                    timeout
                )),
            };

            if let Err(e) = outcome {
                // Coerce whatever failed into a plain message string.
                let _ = tx
                    .send(GraphEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
            }
        });

        rx
    }

    async fn execute_turn(
        input: TurnInput,
        event_tx: mpsc::Sender<GraphEvent>,
        chat_client: Arc<dyn ChatClient>,
        tool_executor: Arc<ToolExecutor>,
        checkpoint_store: Arc<dyn CheckpointStore>,
        config: GraphConfig,
    ) -> Result<()> {
        let mut state = GraphState::new(input.thread_id.clone(), input.model.clone());
        state.approve_all_tools = input.approve_all_tools;

        // Seed from the hydrated checkpoint, if one exists for this thread.
        match checkpoint_store.get(&input.thread_id).await {
            Ok(Some(checkpoint)) => {
                state.messages = checkpoint.channel_values.messages;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(thread_id = %input.thread_id, error = %e, "Checkpoint read failed; starting cold");
            }
        }

        let mut current_node = match input.kind {
            TurnKind::Message(content) => {
                state.add_message(AgentMessage::Human { content });
                NodeType::Agent
            }
            TurnKind::Resume(action) => Self::apply_resume(&mut state, action, &event_tx).await?,
        };

        let agent_node = AgentNode::new(chat_client, Arc::clone(&tool_executor));
        let tools_node = ToolsNode::new(tool_executor);
        let router = ApprovalRouter;

        let mut iteration = 0;

        loop {
            if iteration >= config.max_iterations {
                bail!("Max iterations ({}) reached", config.max_iterations);
            }

            match current_node {
                NodeType::Agent => {
                    agent_node.execute(&mut state, event_tx.clone()).await?;
                }
                NodeType::Tools => {
                    tools_node.execute(&mut state, event_tx.clone()).await?;
                }
                NodeType::ToolApproval => {
                    // The gate itself never executes anything; routing
                    // into it suspends the turn below.
                    unreachable!("approval gate handled at routing time");
                }
            }

            match router.next(&state, current_node) {
                NextNode::End => break,
                NextNode::Agent => current_node = NodeType::Agent,
                NextNode::Tools => current_node = NodeType::Tools,
                NextNode::ToolApproval => {
                    event_tx
                        .send(GraphEvent::Interrupt {
                            tool_calls: state.pending_tool_calls(),
                        })
                        .await?;
                    tracing::debug!(thread_id = %state.thread_id, "Turn suspended at approval gate");
                    break;
                }
            }

            iteration += 1;
        }

        event_tx.send(GraphEvent::Done).await?;
        Ok(())
    }

    /// Apply a resume decision to the seeded state and pick the entry node.
    async fn apply_resume(
        state: &mut GraphState,
        action: ResumeAction,
        event_tx: &mpsc::Sender<GraphEvent>,
    ) -> Result<NodeType> {
        if !state.has_pending_tool_calls() {
            bail!("Resume requested but history carries no pending tool calls");
        }

        match action {
            ResumeAction::Continue => Ok(NodeType::Tools),
            ResumeAction::Update { tool_call } => {
                if !state.update_pending_tool_call(tool_call) {
                    bail!("Updated tool call does not match any pending call");
                }
                Ok(NodeType::Tools)
            }
            ResumeAction::Feedback { message } => {
                // Denial: record a synthetic tool-result per pending call,
                // skip execution entirely and hand back to the model.
                for call in state.pending_tool_calls() {
                    event_tx
                        .send(GraphEvent::ToolResult {
                            id: format!("tool_{}", uuid::Uuid::new_v4()),
                            tool_call_id: call.id.clone(),
                            content: message.clone(),
                            is_error: false,
                        })
                        .await?;
                    state.add_tool_result(call.id, message.clone());
                }
                Ok(NodeType::Agent)
            }
        }
    }
}
