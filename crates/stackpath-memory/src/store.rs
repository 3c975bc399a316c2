use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::checkpoint::Checkpoint;
use crate::error::Result;

/// Storage for conversation checkpoints, keyed by thread id.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn put(&self, thread_id: &str, checkpoint: Checkpoint) -> Result<()>;

    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>>;
}

/// In-memory store. Constructed fresh per request; nothing survives it.
#[derive(Default)]
pub struct MemorySaver {
    checkpoints: RwLock<HashMap<String, Checkpoint>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemorySaver {
    async fn put(&self, thread_id: &str, checkpoint: Checkpoint) -> Result<()> {
        let mut checkpoints = self.checkpoints.write().await;
        checkpoints.insert(thread_id.to_string(), checkpoint);
        Ok(())
    }

    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        let checkpoints = self.checkpoints.read().await;
        Ok(checkpoints.get(thread_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackpath_llm::AgentMessage;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemorySaver::new();
        let checkpoint = Checkpoint::new(vec![AgentMessage::human("hello")]);
        let id = checkpoint.id.clone();

        store.put("T1", checkpoint).await.unwrap();

        let loaded = store.get("T1").await.unwrap().unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.messages().len(), 1);
    }

    #[tokio::test]
    async fn get_unknown_thread_is_none() {
        let store = MemorySaver::new();
        assert!(store.get("missing").await.unwrap().is_none());
    }
}
