//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod conversation_logger;
pub mod llm_gateway;
pub mod operator_prompt;
pub mod tool_channel;
pub mod tool_executor;
pub mod user_store;
