//! Infrastructure layer for dbassist
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer:
//!
//! - [`session`]: client side of the out-of-process tool session
//! - [`server`]: the tool server answering that session
//! - [`tools`] / [`store`]: tool dispatch over the SQLite user store
//! - [`providers`]: HTTP model gateways
//! - [`config`] / [`logging`]: configuration loading and the JSONL transcript

pub mod config;
pub mod logging;
pub mod providers;
pub mod rpc;
pub mod server;
pub mod session;
pub mod store;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig};
pub use logging::JsonlConversationLogger;
pub use providers::build_gateway;
pub use rpc::error::{Result, SessionError};
pub use server::ToolServer;
pub use session::{LaunchSpec, SessionOptions, ToolSession};
pub use store::SqliteUserStore;
pub use tools::{JsonSchemaToolConverter, ToolRegistry};
