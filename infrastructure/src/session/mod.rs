//! Tool session client.
//!
//! - [`LaunchSpec`]: how the tool server child is started
//! - [`MessageRouter`]: background reader + request/response correlation
//! - [`ToolSession`]: handshake, invoke, close

pub mod channel;
pub mod launch;
pub mod router;

pub use channel::{SessionOptions, ToolSession};
pub use launch::LaunchSpec;
pub use router::MessageRouter;
