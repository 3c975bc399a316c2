pub mod message;
pub mod traits;
pub mod streaming;
pub mod openai;

pub use message::{AgentMessage, ToolSpec};
pub use traits::{ChatClient, ChatOptions, ChatRequest, LlmEventStream};
pub use streaming::LlmEvent;
pub use openai::OpenAIClient;
