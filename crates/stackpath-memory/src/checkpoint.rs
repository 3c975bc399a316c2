use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use stackpath_llm::AgentMessage;

/// Snapshot of conversational state for one (thread, request) pair.
///
/// Held only in server memory for the lifetime of a single request;
/// discarded when the response completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub v: u32,
    pub id: String,
    pub ts: DateTime<Utc>,
    pub channel_values: ChannelValues,
    pub channel_versions: HashMap<String, u64>,
    pub versions_seen: HashMap<String, HashMap<String, u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChannelValues {
    pub messages: Vec<AgentMessage>,
}

impl Checkpoint {
    pub fn new(messages: Vec<AgentMessage>) -> Self {
        let mut channel_versions = HashMap::new();
        channel_versions.insert("messages".to_string(), 1);

        Self {
            v: 1,
            id: uuid::Uuid::new_v4().to_string(),
            ts: Utc::now(),
            channel_values: ChannelValues { messages },
            channel_versions,
            versions_seen: HashMap::new(),
        }
    }

    pub fn messages(&self) -> &[AgentMessage] {
        &self.channel_values.messages
    }
}
