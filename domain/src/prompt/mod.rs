//! Prompt domain
//!
//! Templates for the system and user prompts sent to the model.

mod template;

pub use template::PromptTemplate;
