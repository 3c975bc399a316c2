use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use stackpath_types::{ServerTransport, ToolServerConfig, ToolsFile};

use crate::client::McpClient;
use crate::executor::ToolExecutor;

/// Tool-server registry backed by a static configuration file.
///
/// The file is re-read on every [`executor`](Self::executor) call, so
/// edits take effect without a restart; connected clients are cached by
/// server name and reused across calls. Every failure path degrades: an
/// absent or unparsable file yields an empty registry, an unreachable
/// server is logged and its tools are simply absent from the set. The
/// turn always proceeds.
pub struct ToolRegistry {
    path: PathBuf,
    clients: RwLock<HashMap<String, Arc<McpClient>>>,
}

impl ToolRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Assemble the tool set for one agent from the current file contents.
    pub async fn executor(&self) -> ToolExecutor {
        let executor = ToolExecutor::new();

        let file = match read_tools_file(&self.path) {
            Some(file) => file,
            None => return executor,
        };

        for server in file.servers {
            if !server.enabled {
                tracing::debug!(server = %server.name, "Skipping disabled tool server");
                continue;
            }

            if let Some(client) = self.clients.read().await.get(&server.name).cloned() {
                executor.add_client(client).await;
                continue;
            }

            match connect(&server).await {
                Ok(client) => {
                    let client = Arc::new(client);
                    self.clients
                        .write()
                        .await
                        .insert(server.name.clone(), Arc::clone(&client));
                    executor.add_client(client).await;
                }
                Err(e) => {
                    tracing::warn!(server = %server.name, error = %e, "Failed to connect to tool server");
                }
            }
        }

        executor
    }
}

/// One-shot convenience over [`ToolRegistry`] for callers that build a
/// single tool set and keep it.
pub async fn load_registry(path: &Path) -> ToolExecutor {
    ToolRegistry::new(path).executor().await
}

fn read_tools_file(path: &Path) -> Option<ToolsFile> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "No tool configuration; zero tools loaded");
            return None;
        }
    };

    match serde_json::from_str::<ToolsFile>(&raw) {
        Ok(file) => Some(file),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Invalid tool configuration; zero tools loaded");
            None
        }
    }
}

async fn connect(server: &ToolServerConfig) -> anyhow::Result<McpClient> {
    match server.transport {
        ServerTransport::Stdio => {
            let command = server
                .command
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("stdio server '{}' has no command", server.name))?;
            McpClient::connect_stdio(&server.name, command, &server.args, &server.env).await
        }
        ServerTransport::Http => {
            let url = server
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("http server '{}' has no url", server.name))?;
            McpClient::connect_http(&server.name, url, &server.headers).await
        }
    }
}
