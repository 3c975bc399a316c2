use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::events::GraphEvent;
use crate::state::GraphState;

pub type EventSender = mpsc::Sender<GraphEvent>;

/// Unit of computation in the graph. Nodes mutate the shared
/// message-list state and emit events as they run.
#[async_trait]
pub trait Node: Send + Sync {
    async fn execute(&self, state: &mut GraphState, event_tx: EventSender) -> Result<()>;

    fn node_type(&self) -> NodeType;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Agent,
    ToolApproval,
    Tools,
}
