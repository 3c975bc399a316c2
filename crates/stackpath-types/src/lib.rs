pub mod message;
pub mod content;
pub mod tool;
pub mod attachment;
pub mod registry;
pub mod approval;

pub use message::{AiData, ChatMessage, ErrorData, HumanData, Thread, ToolData};
pub use content::{ContentItem, MessageContent};
pub use tool::ToolCall;
pub use attachment::Attachment;
pub use registry::{ServerTransport, ToolServerConfig, ToolsFile};
pub use approval::ApprovalDecision;
