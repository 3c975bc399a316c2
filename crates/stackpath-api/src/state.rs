use std::sync::Arc;

use stackpath_llm::ChatClient;
use stackpath_mcp::ToolRegistry;

use crate::config::Config;
use crate::storage::ObjectStore;

/// Shared application state.
///
/// Deliberately carries no graph and no checkpoint store: both are
/// built fresh per request so nothing conversational leaks across
/// requests. The registry is the one shared resource; it re-reads its
/// config file per agent build and caches tool-server connections
/// (best-effort reuse, no correctness requirement).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chat_client: Arc<dyn ChatClient>,
    pub tool_registry: Arc<ToolRegistry>,
    pub object_store: Arc<dyn ObjectStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        chat_client: Arc<dyn ChatClient>,
        tool_registry: Arc<ToolRegistry>,
        object_store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            chat_client,
            tool_registry,
            object_store,
        }
    }
}
