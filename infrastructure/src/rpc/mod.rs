//! JSON-RPC plumbing shared by the session client and the tool server.
//!
//! - [`protocol`]: message and payload types
//! - [`framing`]: `Content-Length` frame reader/writer
//! - [`transport`]: frame classification
//! - [`error`]: [`SessionError`](error::SessionError)

pub mod error;
pub mod framing;
pub mod protocol;
pub mod transport;
