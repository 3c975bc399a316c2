use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Mutex;

use stackpath_graph::{Graph, GraphConfig, GraphEvent, ResumeAction, TurnInput};
use stackpath_llm::{ChatClient, ChatRequest, LlmEvent, LlmEventStream, ToolSpec};
use stackpath_mcp::{StaticTool, ToolExecutor};
use stackpath_memory::{hydrate, CheckpointStore, MemorySaver};
use stackpath_types::{ChatMessage, ToolCall};

/// Chat client that replays one scripted event sequence per invocation.
struct ScriptedChatClient {
    scripts: Mutex<VecDeque<Vec<Result<LlmEvent>>>>,
}

impl ScriptedChatClient {
    fn new(scripts: Vec<Vec<Result<LlmEvent>>>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
        })
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn chat_stream(&self, _request: ChatRequest) -> Result<LlmEventStream> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![Ok(LlmEvent::Done { finish_reason: None })]);
        Ok(Box::pin(futures::stream::iter(script)))
    }
}

/// Static tool that counts executions.
struct CountingTool {
    executions: Arc<AtomicUsize>,
}

#[async_trait]
impl StaticTool for CountingTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new("search", "Search for things", json!({"type": "object"}))
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(r#"{"results": []}"#.to_string())
    }
}

fn tool_call_script() -> Vec<Result<LlmEvent>> {
    vec![
        Ok(LlmEvent::ToolCall {
            index: 0,
            id: Some("call_1".into()),
            name: Some("search".into()),
            arguments: Some(r#"{"q": "weather"}"#.into()),
        }),
        Ok(LlmEvent::Done {
            finish_reason: Some("tool_calls".into()),
        }),
    ]
}

fn text_script(parts: &[&str]) -> Vec<Result<LlmEvent>> {
    let mut script: Vec<Result<LlmEvent>> = parts
        .iter()
        .map(|p| {
            Ok(LlmEvent::Message {
                content: p.to_string(),
            })
        })
        .collect();
    script.push(Ok(LlmEvent::Done {
        finish_reason: Some("stop".into()),
    }));
    script
}

struct Harness {
    graph: Graph,
    executions: Arc<AtomicUsize>,
    store: Arc<MemorySaver>,
}

fn harness(scripts: Vec<Vec<Result<LlmEvent>>>) -> Harness {
    let executions = Arc::new(AtomicUsize::new(0));
    let mut executor = ToolExecutor::new();
    executor.add_static_tool(Arc::new(CountingTool {
        executions: Arc::clone(&executions),
    }));

    let store = Arc::new(MemorySaver::new());
    let graph = Graph::builder()
        .chat_client(ScriptedChatClient::new(scripts))
        .tool_executor(Arc::new(executor))
        .checkpoint_store(Arc::clone(&store) as Arc<dyn CheckpointStore>)
        .config(GraphConfig::default().with_max_iterations(10))
        .build()
        .unwrap();

    Harness {
        graph,
        executions,
        store,
    }
}

async fn collect(mut rx: tokio::sync::mpsc::Receiver<GraphEvent>) -> Vec<GraphEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn tool_call_without_approve_all_halts_at_the_gate() {
    let h = harness(vec![tool_call_script()]);

    let rx = h.graph.spawn_turn(TurnInput::message("T1", "gpt-4o", "what's the weather?"));
    let events = collect(rx).await;

    let interrupts: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, GraphEvent::Interrupt { .. }))
        .collect();
    assert_eq!(interrupts.len(), 1, "exactly one interrupt: {:?}", events);

    match interrupts[0] {
        GraphEvent::Interrupt { tool_calls } => {
            assert_eq!(tool_calls.len(), 1);
            assert_eq!(tool_calls[0].name, "search");
            assert_eq!(tool_calls[0].args, json!({"q": "weather"}));
        }
        _ => unreachable!(),
    }

    assert_eq!(h.executions.load(Ordering::SeqCst), 0, "no tool may run before approval");
    assert!(matches!(events.last(), Some(GraphEvent::Done)));
}

#[tokio::test]
async fn approve_all_proceeds_straight_to_execution() {
    let h = harness(vec![tool_call_script(), text_script(&["sunny"])]);

    let input = TurnInput::message("T1", "gpt-4o", "what's the weather?")
        .with_approve_all_tools(true);
    let events = collect(h.graph.spawn_turn(input)).await;

    assert!(
        !events.iter().any(|e| matches!(e, GraphEvent::Interrupt { .. })),
        "zero interrupts expected: {:?}",
        events
    );
    assert_eq!(h.executions.load(Ordering::SeqCst), 1);
    assert!(events
        .iter()
        .any(|e| matches!(e, GraphEvent::ToolResult { is_error: false, .. })));
    assert!(matches!(events.last(), Some(GraphEvent::Done)));
}

#[tokio::test]
async fn deny_resume_records_feedback_and_returns_to_agent() {
    // Resumed turn: the model only gets called once, after the denial.
    let h = harness(vec![text_script(&["understood, skipping that"])]);

    // Client-resent history ending in the pending tool-call message.
    let history: Vec<serde_json::Value> = [
        ChatMessage::human("h1", "what's the weather?"),
        ChatMessage::ai_with_tools(
            "a1",
            vec![ToolCall::new("call_1", "search", json!({"q": "weather"}))],
        ),
    ]
    .iter()
    .map(|m| serde_json::to_value(m).unwrap())
    .collect();
    hydrate(h.store.as_ref(), "T1", &history).await;

    let input = TurnInput::resume(
        "T1",
        "gpt-4o",
        ResumeAction::Feedback {
            message: "Tool execution denied by user".into(),
        },
    );
    let events = collect(h.graph.spawn_turn(input)).await;

    assert_eq!(h.executions.load(Ordering::SeqCst), 0, "denied tool must not run");

    let denial = events.iter().find_map(|e| match e {
        GraphEvent::ToolResult {
            tool_call_id,
            content,
            ..
        } => Some((tool_call_id.clone(), content.clone())),
        _ => None,
    });
    assert_eq!(
        denial,
        Some(("call_1".into(), "Tool execution denied by user".into()))
    );

    // The agent ran after the denial and produced text.
    assert!(events
        .iter()
        .any(|e| matches!(e, GraphEvent::Message { content, .. } if content.contains("skipping"))));
    assert!(matches!(events.last(), Some(GraphEvent::Done)));
}

#[tokio::test]
async fn allow_resume_executes_pending_calls() {
    let h = harness(vec![text_script(&["it is sunny"])]);

    let history: Vec<serde_json::Value> = [
        ChatMessage::human("h1", "what's the weather?"),
        ChatMessage::ai_with_tools(
            "a1",
            vec![ToolCall::new("call_1", "search", json!({"q": "weather"}))],
        ),
    ]
    .iter()
    .map(|m| serde_json::to_value(m).unwrap())
    .collect();
    hydrate(h.store.as_ref(), "T1", &history).await;

    let input = TurnInput::resume("T1", "gpt-4o", ResumeAction::Continue);
    let events = collect(h.graph.spawn_turn(input)).await;

    assert_eq!(h.executions.load(Ordering::SeqCst), 1);
    assert!(matches!(events.last(), Some(GraphEvent::Done)));
}

#[tokio::test]
async fn fresh_message_streams_one_logical_ai_message() {
    let h = harness(vec![text_script(&["Hel", "lo ", "there"])]);

    let events = collect(
        h.graph
            .spawn_turn(TurnInput::message("T1", "gpt-4o", "hello")),
    )
    .await;

    let deltas: Vec<(&String, &String)> = events
        .iter()
        .filter_map(|e| match e {
            GraphEvent::Message { id, content } => Some((id, content)),
            _ => None,
        })
        .collect();

    assert_eq!(deltas.len(), 3);
    assert!(deltas.iter().all(|(id, _)| *id == deltas[0].0), "stable id across deltas");

    let text: String = deltas.iter().map(|(_, c)| c.as_str()).collect();
    assert_eq!(text, "Hello there");
}

#[tokio::test]
async fn stream_failure_surfaces_as_terminal_error_event() {
    let h = harness(vec![vec![
        Ok(LlmEvent::Message {
            content: "partial".into(),
        }),
        Err(anyhow::anyhow!("model unavailable")),
    ]]);

    let events = collect(
        h.graph
            .spawn_turn(TurnInput::message("T1", "gpt-4o", "hello")),
    )
    .await;

    match events.last() {
        Some(GraphEvent::Error { message }) => assert!(message.contains("model unavailable")),
        other => panic!("Expected terminal error event, got {:?}", other),
    }
    assert!(!events.iter().any(|e| matches!(e, GraphEvent::Done)));
}

#[tokio::test]
async fn resume_without_pending_calls_is_an_error() {
    let h = harness(vec![]);

    let input = TurnInput::resume("T1", "gpt-4o", ResumeAction::Continue);
    let events = collect(h.graph.spawn_turn(input)).await;

    assert!(matches!(events.last(), Some(GraphEvent::Error { .. })));
}
