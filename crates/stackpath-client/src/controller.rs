use stackpath_types::{
    AiData, ApprovalDecision, ChatMessage, ContentItem, MessageContent, ToolCall,
};
use tracing::warn;
use uuid::Uuid;

use crate::error::ClientError;
use crate::store::LocalStore;

const ERROR_PREFIX: &str = "\u{26a0}\u{fe0f} ";
const TITLE_MAX_CHARS: usize = 48;

/// Where the controller is within a turn's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Streaming,
    /// Suspended at the approval gate; sending is blocked until a decision.
    AwaitingApproval,
}

/// Request the controller wants sent to the streaming endpoint. Carries
/// either new text or an approval decision, never both, plus the full
/// prior history the server reconstructs its checkpoint from.
#[derive(Debug, Clone)]
pub struct OutboundTurn {
    pub thread_id: String,
    pub message: Option<MessageContent>,
    pub history: Vec<ChatMessage>,
    pub allow_tool: Option<ApprovalDecision>,
}

/// Drives one thread's conversation: optimistic human appends, streamed
/// delta reconciliation keyed by message id, approval-gate suspension, and
/// persistence on turn completion.
///
/// One active stream per thread is enforced here; the server does not guard
/// against concurrent turns on the same thread id.
pub struct ChatController {
    store: LocalStore,
    thread_id: String,
    messages: Vec<ChatMessage>,
    in_flight: Option<String>,
    pending_tool_calls: Vec<ToolCall>,
    phase: TurnPhase,
}

impl ChatController {
    /// Open a thread, loading whatever the store already holds for it.
    pub fn open(store: LocalStore, thread_id: impl Into<String>) -> Self {
        let thread_id = thread_id.into();
        let messages = store.messages(&thread_id);
        if let Err(e) = store.set_active_thread(Some(&thread_id)) {
            warn!(thread_id, error = %e, "failed to record active thread");
        }
        Self {
            store,
            thread_id,
            messages,
            in_flight: None,
            pending_tool_calls: Vec::new(),
            phase: TurnPhase::Idle,
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Visible message list, in display order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Tool calls waiting on an allow/deny decision, if any.
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        &self.pending_tool_calls
    }

    /// Start a turn: append the human message optimistically and produce the
    /// request to send. History excludes the new message; the server appends
    /// it after hydrating.
    pub fn send(&mut self, content: impl Into<MessageContent>) -> Result<OutboundTurn, ClientError> {
        if self.phase != TurnPhase::Idle {
            return Err(ClientError::TurnInFlight(self.thread_id.clone()));
        }

        let history = self.messages.clone();
        let content = content.into();
        self.messages
            .push(ChatMessage::human(format!("msg_{}", Uuid::new_v4()), content.clone()));
        self.phase = TurnPhase::Streaming;
        self.in_flight = None;

        Ok(OutboundTurn {
            thread_id: self.thread_id.clone(),
            message: Some(content),
            history,
            allow_tool: None,
        })
    }

    /// Reconcile one streamed delta into the visible list.
    ///
    /// An `ai` delta with the tracked in-flight id appends its text to that
    /// entry in place; any other delta starts a new entry.
    pub fn apply_delta(&mut self, delta: ChatMessage) {
        match delta {
            ChatMessage::Ai(data) if self.in_flight.as_deref() == Some(data.id.as_str()) => {
                if let Some(ChatMessage::Ai(tracked)) = self
                    .messages
                    .iter_mut()
                    .find(|m| m.id() == data.id && matches!(m, ChatMessage::Ai(_)))
                {
                    merge_ai_delta(tracked, data);
                }
            }
            ChatMessage::Ai(data) => {
                self.in_flight = Some(data.id.clone());
                self.messages.push(ChatMessage::Ai(data));
            }
            other => {
                // A tool result or error closes out the tracked segment.
                self.in_flight = None;
                self.messages.push(other);
            }
        }
    }

    /// The stream asked for a tool approval: block sending until a decision.
    pub fn suspend_for_approval(&mut self, tool_calls: Vec<ToolCall>) {
        self.pending_tool_calls = tool_calls;
        self.phase = TurnPhase::AwaitingApproval;
        self.in_flight = None;
    }

    /// Resume a suspended turn with the user's decision. The produced request
    /// carries the decision instead of new text.
    pub fn resolve_approval(
        &mut self,
        decision: ApprovalDecision,
    ) -> Result<OutboundTurn, ClientError> {
        if self.phase != TurnPhase::AwaitingApproval {
            return Err(ClientError::NoPendingApproval);
        }
        self.pending_tool_calls.clear();
        self.phase = TurnPhase::Streaming;

        Ok(OutboundTurn {
            thread_id: self.thread_id.clone(),
            message: None,
            history: self.messages.clone(),
            allow_tool: Some(decision),
        })
    }

    /// The stream finished: clear the tracker and persist the final list.
    ///
    /// A turn that ended at the approval gate stays suspended; only the
    /// user's decision lifts it.
    pub fn complete(&mut self) {
        self.in_flight = None;
        if self.phase != TurnPhase::AwaitingApproval {
            self.phase = TurnPhase::Idle;
        }
        self.persist();
    }

    /// The stream failed: surface a synthetic error message, then close out
    /// the turn the same way completion does. Input is usable again after.
    pub fn fail(&mut self, message: &str) {
        self.in_flight = None;
        self.pending_tool_calls.clear();
        self.messages.push(ChatMessage::error(
            format!("msg_{}", Uuid::new_v4()),
            format!("{ERROR_PREFIX}{message}"),
        ));
        self.phase = TurnPhase::Idle;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.store.save_messages(&self.thread_id, &self.messages) {
            warn!(thread_id = %self.thread_id, error = %e, "failed to persist messages");
        }
        if let Err(e) = self.store.touch_thread(&self.thread_id, self.derived_title().as_deref()) {
            warn!(thread_id = %self.thread_id, error = %e, "failed to touch thread");
        }
    }

    /// Title the thread from its first human message.
    fn derived_title(&self) -> Option<String> {
        let first = self.messages.iter().find_map(|m| match m {
            ChatMessage::Human(d) => Some(d.content.joined_text()),
            _ => None,
        })?;
        let mut title: String = first.chars().take(TITLE_MAX_CHARS).collect();
        if first.chars().count() > TITLE_MAX_CHARS {
            title.push('\u{2026}');
        }
        Some(title)
    }
}

fn merge_ai_delta(existing: &mut AiData, delta: AiData) {
    append_text(&mut existing.content, &delta.content.joined_text());
    if delta.tool_calls.is_some() {
        existing.tool_calls = delta.tool_calls;
    }
    if delta.response_metadata.is_some() {
        existing.response_metadata = delta.response_metadata;
    }
}

fn append_text(content: &mut MessageContent, extra: &str) {
    if extra.is_empty() {
        return;
    }
    match content {
        MessageContent::Text(s) => s.push_str(extra),
        MessageContent::Items(items) => items.push(ContentItem::Text {
            text: extra.to_string(),
        }),
    }
}
