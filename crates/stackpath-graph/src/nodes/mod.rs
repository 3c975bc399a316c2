pub mod agent;
pub mod tools;

pub use agent::AgentNode;
pub use tools::ToolsNode;
