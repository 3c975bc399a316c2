//! Prelude module for convenient imports
//!
//! Import everything you need with:
//! ```rust
//! use stackpath::prelude::*;
//! ```

pub use crate::{
    ApprovalDecision, ChatMessage, MessageContent, Thread, ToolCall,
    AgentMessage, ChatClient, ChatOptions, ChatRequest, LlmEvent, OpenAIClient, ToolSpec,
    load_registry, McpClient, StaticTool, ToolExecutor,
    hydrate, Checkpoint, CheckpointStore, MemorySaver,
    Graph, GraphBuilder, GraphConfig, GraphEvent, GraphState, ResumeAction, TurnInput,
    ChatController, LocalStore, MemoryBackend, OutboundTurn, StorageBackend, TurnPhase,
};
