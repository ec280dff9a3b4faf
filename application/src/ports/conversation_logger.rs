//! Conversation transcript port.
//!
//! Every step of a turn is recorded as one [`ConversationEvent`]. The
//! adapter decides the storage (the infrastructure layer writes JSONL); this
//! port only fixes the event vocabulary. Diagnostic output stays with
//! `tracing`.

use serde_json::Value;

/// Event type names written to the transcript
pub mod events {
    pub const OPERATOR_INPUT: &str = "operator_input";
    pub const MODEL_REPLY: &str = "model_reply";
    pub const MODEL_UNAVAILABLE: &str = "model_unavailable";
    pub const COMMAND_PARSED: &str = "command_parsed";
    pub const COMMAND_MALFORMED: &str = "command_malformed";
    pub const TOOL_RESULT: &str = "tool_result";
}

/// One transcript entry: an event type from [`events`] and its fields.
pub struct ConversationEvent {
    pub event_type: &'static str,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for transcript events.
///
/// Infallible from the caller's side: a broken log file must not end the
/// interactive loop.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
