use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use stackpath_llm::ToolSpec;

use crate::client::McpClient;

/// Statically configured tool executed in-process, merged into the bound
/// tool set alongside registry-loaded server tools.
#[async_trait]
pub trait StaticTool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    async fn execute(&self, arguments: Value) -> Result<String>;
}

/// Executor over the merged tool set: static tools plus connected servers.
#[derive(Default)]
pub struct ToolExecutor {
    static_tools: Vec<Arc<dyn StaticTool>>,
    clients: RwLock<HashMap<String, Arc<McpClient>>>,
}

impl ToolExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_static_tool(&mut self, tool: Arc<dyn StaticTool>) {
        self.static_tools.push(tool);
    }

    pub async fn add_client(&self, client: Arc<McpClient>) {
        let mut clients = self.clients.write().await;
        clients.insert(client.name().to_string(), client);
    }

    /// The merged tool list in the form the model sees.
    pub async fn llm_tools(&self) -> Vec<ToolSpec> {
        let mut tools: Vec<ToolSpec> = self.static_tools.iter().map(|t| t.spec()).collect();

        let clients = self.clients.read().await;
        for client in clients.values() {
            tools.extend(client.tools().iter().cloned());
        }

        tools
    }

    /// Execute a tool by name, routing to the owning server.
    pub async fn execute(&self, tool_name: &str, arguments: Value) -> Result<String> {
        if let Some(tool) = self
            .static_tools
            .iter()
            .find(|t| t.spec().name == tool_name)
        {
            return tool.execute(arguments).await;
        }

        let client = {
            let clients = self.clients.read().await;
            clients
                .values()
                .find(|c| c.has_tool(tool_name))
                .cloned()
        };

        match client {
            Some(client) => client.call_tool(tool_name, arguments).await,
            None => Err(anyhow!("Tool '{}' not found", tool_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl StaticTool for EchoTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new("echo", "Echo arguments back", json!({"type": "object"}))
        }

        async fn execute(&self, arguments: Value) -> Result<String> {
            Ok(arguments.to_string())
        }
    }

    #[tokio::test]
    async fn static_tools_appear_in_merged_list_and_execute() {
        let mut executor = ToolExecutor::new();
        executor.add_static_tool(Arc::new(EchoTool));

        let tools = executor.llm_tools().await;
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "echo");

        let result = executor.execute("echo", json!({"x": 1})).await.unwrap();
        assert_eq!(result, r#"{"x":1}"#);
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let executor = ToolExecutor::new();
        assert!(executor.execute("nope", json!({})).await.is_err());
    }
}
