//! Tool implementations served by the tool server
//!
//! - [`ToolRegistry`]: dispatcher implementing `ToolExecutorPort`
//! - [`users`]: `create_table`, `insert_user`, `list_users` over a `UserStore`
//! - [`JsonSchemaToolConverter`]: definitions ↔ `tools/list` descriptors

pub mod registry;
pub mod schema;
pub mod users;

pub use registry::{ToolHandler, ToolRegistry};
pub use schema::JsonSchemaToolConverter;
