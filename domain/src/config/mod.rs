//! Configuration value objects for the domain layer
//!
//! These are domain concepts related to configuration that are
//! used across multiple layers.

mod provider_kind;
pub mod validation;

pub use provider_kind::ProviderKind;
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
