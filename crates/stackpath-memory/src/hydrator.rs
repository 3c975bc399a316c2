use serde_json::Value;

use stackpath_llm::AgentMessage;
use stackpath_types::ChatMessage;

use crate::checkpoint::Checkpoint;
use crate::store::CheckpointStore;

/// Seed the checkpoint store for `thread_id` from client-supplied history.
///
/// Best-effort, single attempt: malformed items are logged and skipped,
/// store failures are logged and swallowed. Losing history degrades the
/// turn to cold memory instead of failing the request.
///
/// Returns the number of messages hydrated. Empty history is a no-op
/// (no checkpoint is written).
pub async fn hydrate(store: &dyn CheckpointStore, thread_id: &str, history: &[Value]) -> usize {
    if history.is_empty() {
        return 0;
    }

    let mut messages = Vec::with_capacity(history.len());

    for (index, raw) in history.iter().enumerate() {
        match serde_json::from_value::<ChatMessage>(raw.clone()) {
            Ok(message) => {
                if let Some(converted) = convert_message(message) {
                    messages.push(converted);
                }
            }
            Err(e) => {
                tracing::warn!(thread_id, index, error = %e, "Skipping malformed history item");
            }
        }
    }

    let count = messages.len();
    let checkpoint = Checkpoint::new(messages);

    if let Err(e) = store.put(thread_id, checkpoint).await {
        tracing::warn!(thread_id, error = %e, "Failed to write checkpoint; proceeding with cold memory");
        return 0;
    }

    tracing::debug!(thread_id, count, "Hydrated checkpoint from client history");
    count
}

/// Convert one client message into the internal representation.
///
/// `error` messages are client-side furniture and carry nothing the
/// model should see, so they convert to `None`.
pub fn convert_message(message: ChatMessage) -> Option<AgentMessage> {
    match message {
        ChatMessage::Human(data) => Some(AgentMessage::Human {
            content: data.content,
        }),
        ChatMessage::Ai(data) => Some(AgentMessage::AI {
            content: Some(data.content),
            tool_calls: data.tool_calls,
            response_metadata: data.response_metadata,
        }),
        ChatMessage::Tool(data) => Some(AgentMessage::Tool {
            tool_call_id: data.tool_call_id,
            content: data.content,
        }),
        ChatMessage::Error(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySaver;
    use serde_json::json;
    use stackpath_types::{MessageContent, ToolCall};

    fn history_values(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| serde_json::to_value(m).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn roles_and_text_round_trip_in_order() {
        let store = MemorySaver::new();
        let history = history_values(&[
            ChatMessage::human("h1", "hello"),
            ChatMessage::ai("a1", "hi there"),
            ChatMessage::tool("t1", "call_9", "{\"ok\":true}"),
        ]);

        let count = hydrate(&store, "T1", &history).await;
        assert_eq!(count, 3);

        let checkpoint = store.get("T1").await.unwrap().unwrap();
        let roles: Vec<&str> = checkpoint.messages().iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec!["user", "assistant", "tool"]);

        match &checkpoint.messages()[0] {
            AgentMessage::Human { content } => assert_eq!(content.joined_text(), "hello"),
            other => panic!("Expected human message, got {:?}", other),
        }
        match &checkpoint.messages()[2] {
            AgentMessage::Tool { tool_call_id, .. } => assert_eq!(tool_call_id, "call_9"),
            other => panic!("Expected tool message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn ai_tool_calls_are_preserved_untouched() {
        let store = MemorySaver::new();
        let calls = vec![
            ToolCall::new("call_1", "search", json!({"q": "weather"})),
            ToolCall::new("call_2", "fetch", json!({"url": "https://x"})),
        ];
        let history = history_values(&[ChatMessage::ai_with_tools("a1", calls.clone())]);

        hydrate(&store, "T1", &history).await;

        let checkpoint = store.get("T1").await.unwrap().unwrap();
        assert_eq!(checkpoint.messages()[0].tool_calls(), Some(calls.as_slice()));
    }

    #[tokio::test]
    async fn structured_content_is_lossless() {
        let store = MemorySaver::new();
        let content = MessageContent::Items(vec![
            stackpath_types::ContentItem::Text { text: "see".into() },
            stackpath_types::ContentItem::ImageUrl { url: "https://x/i.png".into() },
        ]);
        let history = history_values(&[ChatMessage::human("h1", content.clone())]);

        hydrate(&store, "T1", &history).await;

        let checkpoint = store.get("T1").await.unwrap().unwrap();
        match &checkpoint.messages()[0] {
            AgentMessage::Human { content: stored } => assert_eq!(*stored, content),
            other => panic!("Expected human message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_items_are_skipped_not_fatal() {
        let store = MemorySaver::new();
        let mut history = history_values(&[ChatMessage::human("h1", "hello")]);
        history.push(json!({"type": "banana", "data": 12}));
        history.push(serde_json::to_value(ChatMessage::ai("a1", "hi")).unwrap());

        let count = hydrate(&store, "T1", &history).await;
        assert_eq!(count, 2);
        assert_eq!(store.get("T1").await.unwrap().unwrap().messages().len(), 2);
    }

    #[tokio::test]
    async fn empty_history_writes_no_checkpoint() {
        let store = MemorySaver::new();
        assert_eq!(hydrate(&store, "T1", &[]).await, 0);
        assert!(store.get("T1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_failure_is_swallowed_and_reports_cold_memory() {
        struct FailingStore;

        #[async_trait::async_trait]
        impl CheckpointStore for FailingStore {
            async fn put(&self, _thread_id: &str, _checkpoint: Checkpoint) -> crate::error::Result<()> {
                Err(crate::MemoryError::Store("disk full".into()))
            }

            async fn get(&self, _thread_id: &str) -> crate::error::Result<Option<Checkpoint>> {
                Ok(None)
            }
        }

        let history = history_values(&[ChatMessage::human("h1", "hello")]);
        assert_eq!(hydrate(&FailingStore, "T1", &history).await, 0);
    }

    #[tokio::test]
    async fn error_messages_are_dropped() {
        let store = MemorySaver::new();
        let history = history_values(&[
            ChatMessage::human("h1", "hello"),
            ChatMessage::error("e1", "something broke"),
        ]);

        assert_eq!(hydrate(&store, "T1", &history).await, 1);
    }
}
