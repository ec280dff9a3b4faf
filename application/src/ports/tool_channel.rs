//! Tool channel port
//!
//! The client side of the out-of-process tool session. The interactive loop
//! only ever talks to the tool server through this trait.

use async_trait::async_trait;
use dbassist_domain::tool::{
    entities::{ToolCall, ToolDefinition},
    value_objects::ToolResult,
};

/// Channel to a running tool server
///
/// `invoke` never blocks indefinitely: a closed channel or an elapsed
/// timeout comes back as a `Transport` failure inside the result.
#[async_trait]
pub trait ToolChannelPort: Send + Sync {
    /// Tools reported by the server during the handshake
    fn tools(&self) -> &[ToolDefinition];

    /// Whether the server has gone away, as opposed to being slow
    fn is_closed(&self) -> bool {
        false
    }

    /// Send one invocation and wait for its result
    async fn invoke(&self, call: &ToolCall) -> ToolResult;
}
