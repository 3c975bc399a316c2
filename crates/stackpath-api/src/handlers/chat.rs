use axum::{
    extract::State,
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;

use stackpath_graph::{Graph, GraphEvent, ResumeAction, TurnInput};
use stackpath_memory::{hydrate, CheckpointStore, MemorySaver};
use stackpath_types::{AiData, ApprovalDecision, ChatMessage, MessageContent, ToolData};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DENIAL_FEEDBACK: &str = "Tool execution denied by user";

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub thread_id: String,

    /// Fresh user text; absent on resume requests.
    #[serde(default)]
    pub message: Option<MessageContent>,

    /// Full client-held conversation history, serialized message objects.
    #[serde(default)]
    pub history: Vec<Value>,

    #[serde(default)]
    pub model: Option<String>,

    /// Present when resuming a turn suspended at the approval gate.
    #[serde(default)]
    pub allow_tool: Option<ApprovalDecision>,

    #[serde(default)]
    pub approve_all_tools: bool,
}

/// Drive one turn of a per-request agent graph and stream wire deltas.
///
/// Nothing here outlives the request: the checkpoint store and the graph
/// are both private to this call. Concurrent turns on one thread id are
/// not guarded server-side; the client enforces single-flight.
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequestBody>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    if body.thread_id.is_empty() {
        return Err(ApiError::BadRequest("thread_id is required".to_string()));
    }

    let model = body
        .model
        .clone()
        .unwrap_or_else(|| state.config.llm.model.clone());

    // Request-scoped memory, seeded from the client-resent history.
    let store: Arc<MemorySaver> = Arc::new(MemorySaver::new());
    let hydrated = hydrate(store.as_ref(), &body.thread_id, &body.history).await;
    tracing::debug!(thread_id = %body.thread_id, hydrated, "Memory hydrated");

    let input = match body.allow_tool {
        Some(decision) => {
            let action = match decision {
                ApprovalDecision::Allow => ResumeAction::Continue,
                ApprovalDecision::Deny => ResumeAction::Feedback {
                    message: DENIAL_FEEDBACK.to_string(),
                },
            };
            TurnInput::resume(&body.thread_id, &model, action)
        }
        None => {
            let content = body
                .message
                .clone()
                .ok_or_else(|| ApiError::BadRequest("message is required".to_string()))?;
            TurnInput::message(&body.thread_id, &model, content)
        }
    }
    .with_approve_all_tools(body.approve_all_tools);

    // Fresh graph and tool set per request; the registry re-reads its
    // config file and only the tool-server connections are shared.
    let tool_executor = Arc::new(state.tool_registry.executor().await);
    let graph = Graph::builder()
        .chat_client(Arc::clone(&state.chat_client))
        .tool_executor(tool_executor)
        .checkpoint_store(store as Arc<dyn CheckpointStore>)
        .build()?;

    let events = ReceiverStream::new(graph.spawn_turn(input));

    let sse_stream = events.map(|event| Ok::<Event, Infallible>(sse_event(event)));

    Ok(Sse::new(sse_stream))
}

/// Map one graph event onto the SSE wire.
fn sse_event(event: GraphEvent) -> Event {
    match &event {
        GraphEvent::Interrupt { tool_calls } => json_event(
            Event::default().event("interrupt"),
            &serde_json::json!({ "tool_calls": tool_calls }),
        ),
        GraphEvent::Done => Event::default().event("done").data("{}"),
        GraphEvent::Error { message } => json_event(
            Event::default().event("error"),
            &serde_json::json!({ "message": message }),
        ),
        _ => match wire_delta(event) {
            Some(delta) => json_event(Event::default(), &delta),
            None => Event::default().comment("skip"),
        },
    }
}

fn json_event<T: serde::Serialize>(event: Event, payload: &T) -> Event {
    match event.json_data(payload) {
        Ok(event) => event,
        // Serialization of our own types cannot realistically fail;
        // degrade to an error event rather than panic.
        Err(e) => Event::default()
            .event("error")
            .data(format!("{{\"message\":\"{}\"}}", e)),
    }
}

/// Convert a graph event into a client-facing message delta.
///
/// Text deltas reuse the graph's message id so the client can append
/// idempotently; tool-call messages are emitted whole.
pub fn wire_delta(event: GraphEvent) -> Option<ChatMessage> {
    match event {
        GraphEvent::Message { id, content } => {
            if content.is_empty() {
                None
            } else {
                Some(ChatMessage::ai(id, content))
            }
        }
        GraphEvent::ToolCallMessage {
            id,
            tool_calls,
            response_metadata,
        } => Some(ChatMessage::Ai(AiData {
            id,
            content: MessageContent::text(""),
            tool_calls: Some(tool_calls),
            response_metadata,
        })),
        GraphEvent::ToolResult {
            id,
            tool_call_id,
            content,
            ..
        } => Some(ChatMessage::Tool(ToolData {
            id,
            content: MessageContent::text(content),
            tool_call_id,
            name: None,
        })),
        GraphEvent::Interrupt { .. } | GraphEvent::Done | GraphEvent::Error { .. } => None,
    }
}
