//! Tool-execution server side of the session protocol

mod tool_server;

pub use tool_server::ToolServer;
