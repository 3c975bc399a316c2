pub mod client;
pub mod executor;
pub mod loader;

pub use client::McpClient;
pub use executor::{StaticTool, ToolExecutor};
pub use loader::{load_registry, ToolRegistry};
