//! # Stackpath
//!
//! Streaming LLM chat agent with approval-gated tool execution and
//! client-held conversation state.
//!
//! ## Overview
//!
//! Stackpath wires an LLM into a small state machine that can:
//!
//! - **Stream responses** over Server-Sent Events, token by token
//! - **Execute tools** declared in a registry file, over MCP (stdio or HTTP)
//! - **Gate tool calls** behind an explicit user allow/deny decision
//! - **Keep no server state**: the client resends history and the server
//!   rebuilds a request-scoped checkpoint every turn
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stackpath::prelude::*;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let chat_client = Arc::new(OpenAIClient::new(std::env::var("OPENAI_API_KEY")?)?);
//!     let tool_executor = Arc::new(load_registry(Path::new("tools.json")).await);
//!     let checkpoint_store = Arc::new(MemorySaver::new());
//!
//!     let graph = Graph::builder()
//!         .chat_client(chat_client)
//!         .tool_executor(tool_executor)
//!         .checkpoint_store(checkpoint_store)
//!         .build()?;
//!
//!     let input = TurnInput::message("thread-1", "gpt-4o", "Hello!");
//!     let mut events = graph.spawn_turn(input);
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             GraphEvent::Message { content, .. } => print!("{content}"),
//!             GraphEvent::Done => break,
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Stackpath is organized into focused crates:
//!
//! - **`stackpath-types`**: wire-level message, attachment, and registry types
//! - **`stackpath-llm`**: provider-agnostic chat client with SSE streaming
//! - **`stackpath-mcp`**: tool registry loader and MCP tool executor
//! - **`stackpath-memory`**: request-scoped checkpoints and history hydration
//! - **`stackpath-graph`**: agent / tool-approval / tools state machine
//! - **`stackpath-client`**: local persistence store and delta reconciliation

pub mod prelude;

pub use stackpath_types::{
    AiData, ApprovalDecision, Attachment, ChatMessage, ContentItem, ErrorData, HumanData,
    MessageContent, ServerTransport, Thread, ToolCall, ToolData,
    ToolServerConfig, ToolsFile,
};

pub use stackpath_llm::{
    AgentMessage, ChatClient, ChatOptions, ChatRequest, LlmEvent, LlmEventStream, OpenAIClient,
    ToolSpec,
};

pub use stackpath_mcp::{load_registry, McpClient, StaticTool, ToolExecutor, ToolRegistry};

pub use stackpath_memory::{hydrate, Checkpoint, CheckpointStore, MemoryError, MemorySaver};

pub use stackpath_graph::{
    Graph, GraphBuilder, GraphConfig, GraphEvent, GraphState, ResumeAction, TurnInput,
};

pub use stackpath_client::{
    ChatController, ClientError, FileBackend, LocalStore, MemoryBackend, OutboundTurn,
    StorageBackend, TurnPhase,
};
