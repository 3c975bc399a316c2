pub mod state;
pub mod events;
pub mod node;
pub mod router;
pub mod nodes;
pub mod builder;
pub mod graph;

pub use state::{GraphConfig, GraphState, ResumeAction, TurnInput};
pub use events::GraphEvent;
pub use node::{EventSender, Node, NodeType};
pub use router::{ApprovalRouter, NextNode, Router};
pub use builder::GraphBuilder;
pub use graph::Graph;
