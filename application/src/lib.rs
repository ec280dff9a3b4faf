//! Application layer for dbassist
//!
//! This crate contains the per-turn use case and the port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway},
    operator_prompt::{NoOperatorPrompt, OperatorPrompt, OperatorPromptError},
    tool_channel::ToolChannelPort,
    tool_executor::ToolExecutorPort,
    user_store::UserStore,
};
pub use use_cases::process_turn::{ProcessTurnUseCase, TurnOutcome};
