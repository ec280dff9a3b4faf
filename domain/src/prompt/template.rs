//! Prompt templates for the command-routing flow

use crate::tool::entities::ToolDefinition;

/// Templates for the prompts sent to the model
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt instructing the model to answer with `CMD:` lines
    pub fn system() -> &'static str {
        r#"You are a database assistant. You translate the user's request into exactly one command.
Available commands:
- Create a table: CMD:CREATE table="<name>"   (omit table to use "users")
- Add a user:     CMD:INSERT name="<full name>" email="<email>"
- Show all users: CMD:LIST

Rules:
1. Reply with a single command line when the user asks for one of these operations.
2. Always quote argument values with double quotes.
3. Table names contain only letters and digits.
4. If the request is not about these operations, answer briefly in plain text without any CMD: line."#
    }

    /// System prompt that also lists the tools reported by the server
    pub fn system_with_tools<'a>(tools: impl IntoIterator<Item = &'a ToolDefinition>) -> String {
        let mut prompt = Self::system().to_string();
        let mut listed = false;

        for tool in tools {
            if !listed {
                prompt.push_str("\n\nThe database server currently offers these tools:\n");
                listed = true;
            }
            prompt.push_str(&format!("- {}: {}\n", tool.name, tool.description));
        }

        prompt
    }

    /// User prompt wrapping the operator's request
    pub fn user_request(input: &str) -> String {
        format!("User request: {}", input.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandGrammar;
    use crate::tool::default_tool_spec;

    #[test]
    fn test_system_prompt_mentions_every_marker() {
        let prompt = PromptTemplate::system();
        assert!(prompt.contains("CMD:CREATE"));
        assert!(prompt.contains("CMD:INSERT"));
        assert!(prompt.contains("CMD:LIST"));
    }

    #[test]
    fn test_system_prompt_example_lines_parse() {
        let grammar = CommandGrammar::new();
        for line in PromptTemplate::system().lines().filter(|l| l.starts_with("- ")) {
            assert!(grammar.parse(line).is_some(), "{line}");
        }
    }

    #[test]
    fn test_system_with_tools() {
        let spec = default_tool_spec();
        let prompt = PromptTemplate::system_with_tools(spec.sorted());
        assert!(prompt.contains("- create_table:"));
        assert!(prompt.contains("- list_users:"));

        let bare = PromptTemplate::system_with_tools(std::iter::empty());
        assert_eq!(bare, PromptTemplate::system());
    }

    #[test]
    fn test_user_request() {
        assert_eq!(
            PromptTemplate::user_request("  add Bob  "),
            "User request: add Bob"
        );
    }
}
