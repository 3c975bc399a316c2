use anyhow::{anyhow, Result};
use std::sync::Arc;

use stackpath_llm::ChatClient;
use stackpath_mcp::ToolExecutor;
use stackpath_memory::CheckpointStore;

use crate::graph::Graph;
use crate::state::GraphConfig;

/// Pure factory for per-request graphs: every call site builds a fresh
/// instance parameterized by its own client, tool set and checkpoint
/// store. No module-level caching.
pub struct GraphBuilder {
    chat_client: Option<Arc<dyn ChatClient>>,
    tool_executor: Option<Arc<ToolExecutor>>,
    checkpoint_store: Option<Arc<dyn CheckpointStore>>,
    config: GraphConfig,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            chat_client: None,
            tool_executor: None,
            checkpoint_store: None,
            config: GraphConfig::default(),
        }
    }

    pub fn chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.chat_client = Some(client);
        self
    }

    pub fn tool_executor(mut self, executor: Arc<ToolExecutor>) -> Self {
        self.tool_executor = Some(executor);
        self
    }

    pub fn checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoint_store = Some(store);
        self
    }

    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Graph> {
        let chat_client = self
            .chat_client
            .ok_or_else(|| anyhow!("Chat client is required"))?;
        let tool_executor = self
            .tool_executor
            .ok_or_else(|| anyhow!("Tool executor is required"))?;
        let checkpoint_store = self
            .checkpoint_store
            .ok_or_else(|| anyhow!("Checkpoint store is required"))?;

        Ok(Graph::new(
            chat_client,
            tool_executor,
            checkpoint_store,
            self.config,
        ))
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
