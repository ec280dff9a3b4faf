//! Console output formatter for turn outcomes and tool results

use colored::Colorize;
use dbassist_application::TurnOutcome;
use dbassist_domain::{Command, ConfigIssue, FailureKind, ToolDefinition, ToolResult};

/// Formats dbassist output for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format everything one turn produced.
    ///
    /// The model reply is only echoed for command turns when `show_reply`
    /// is set; conversational replies are always shown.
    pub fn format_outcome(outcome: &TurnOutcome, show_reply: bool) -> String {
        let mut output = String::new();

        match outcome {
            TurnOutcome::Conversational { reply } => {
                output.push_str(&Self::format_reply(reply));
            }
            TurnOutcome::Executed {
                reply,
                command,
                result,
            } => {
                if show_reply {
                    output.push_str(&Self::format_reply(reply));
                    output.push('\n');
                }
                output.push_str(&Self::format_action(command));
                output.push('\n');
                output.push_str(&Self::format_result(result));
            }
            TurnOutcome::Malformed {
                reply,
                kind,
                reason,
            } => {
                if show_reply {
                    output.push_str(&Self::format_reply(reply));
                    output.push('\n');
                }
                output.push_str(&format!(
                    "{} {} command not executed: {}",
                    "!".yellow().bold(),
                    kind,
                    reason
                ));
            }
            TurnOutcome::Cancelled { .. } => {
                output.push_str(&format!("{} Insert cancelled.", "!".yellow().bold()));
            }
            TurnOutcome::ModelUnavailable { error } => {
                output.push_str(&format!(
                    "{} {}",
                    "Model unavailable:".red().bold(),
                    error
                ));
            }
            TurnOutcome::EmptyReply => {
                output.push_str(&"(the model returned an empty reply)".dimmed().to_string());
            }
        }

        output
    }

    /// Format a conversational model reply
    pub fn format_reply(reply: &str) -> String {
        format!("{} {}", "assistant:".cyan().bold(), reply.trim())
    }

    /// Format the line announcing which command is about to run
    pub fn format_action(command: &Command) -> String {
        format!("{} {}", "→".cyan(), command.to_string().bold())
    }

    /// Format a tool result: green on success, red with its kind on failure
    pub fn format_result(result: &ToolResult) -> String {
        match result.error() {
            None => format!("{} {}", "✓".green().bold(), result.display_text().green()),
            Some(err) => format!(
                "{} {} {}",
                "✗".red().bold(),
                Self::kind_label(err.kind).red().bold(),
                err.message.red()
            ),
        }
    }

    /// Format a tool result as JSON
    pub fn format_result_json(result: &ToolResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the server's tool list
    pub fn format_tools(tools: &[ToolDefinition]) -> String {
        if tools.is_empty() {
            return "No tools available.".dimmed().to_string();
        }

        let mut output = format!("{}\n", "Available tools:".cyan().bold());
        for tool in tools {
            let params = tool
                .parameters
                .iter()
                .map(|p| {
                    if p.required {
                        p.name.clone()
                    } else {
                        format!("{}?", p.name)
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            output.push_str(&format!(
                "  {}({})  {}\n",
                tool.name.yellow(),
                params,
                tool.description.dimmed()
            ));
        }
        output
    }

    /// Format the server's tool list as JSON
    pub fn format_tools_json(tools: &[ToolDefinition]) -> String {
        serde_json::to_string_pretty(tools).unwrap_or_else(|_| "[]".to_string())
    }

    /// Format a configuration problem found at startup
    pub fn format_issue(issue: &ConfigIssue) -> String {
        if issue.is_error() {
            format!("{} {}", "error:".red().bold(), issue.message)
        } else {
            format!("{} {}", "warning:".yellow().bold(), issue.message)
        }
    }

    fn kind_label(kind: FailureKind) -> String {
        let label = match kind {
            FailureKind::Validation => "invalid request",
            FailureKind::Constraint => "rejected",
            FailureKind::StoreUnavailable => "database unavailable",
            FailureKind::Store => "database error",
            FailureKind::Transport => "tool server unreachable",
        };
        format!("[{}]", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbassist_domain::{ToolError, ToolKind, default_tool_spec};

    fn plain<T>(f: impl FnOnce() -> T) -> T {
        colored::control::set_override(false);
        f()
    }

    #[test]
    fn test_success_and_failure_results() {
        plain(|| {
            let ok = ToolResult::success("list_users", "No users found.");
            assert_eq!(ConsoleFormatter::format_result(&ok), "✓ No users found.");

            let dup = ToolResult::failure(
                "insert_user",
                ToolError::constraint("A user with email 'bob@x.com' already exists"),
            );
            assert_eq!(
                ConsoleFormatter::format_result(&dup),
                "✗ [rejected] A user with email 'bob@x.com' already exists"
            );
        });
    }

    #[test]
    fn test_executed_outcome_hides_reply_unless_asked() {
        plain(|| {
            let outcome = TurnOutcome::Executed {
                reply: "CMD:LIST".to_string(),
                command: Command::ListUsers,
                result: ToolResult::success("list_users", "No users found."),
            };

            let quiet = ConsoleFormatter::format_outcome(&outcome, false);
            assert_eq!(quiet, "→ list users\n✓ No users found.");

            let verbose = ConsoleFormatter::format_outcome(&outcome, true);
            assert!(verbose.starts_with("assistant: CMD:LIST\n"));
        });
    }

    #[test]
    fn test_malformed_and_unavailable() {
        plain(|| {
            let malformed = TurnOutcome::Malformed {
                reply: "CMD:INSERT name=Bob".to_string(),
                kind: ToolKind::InsertUser,
                reason: "missing email".to_string(),
            };
            let text = ConsoleFormatter::format_outcome(&malformed, false);
            assert!(text.contains("not executed: missing email"));

            let down = TurnOutcome::ModelUnavailable {
                error: "Connection error: refused".to_string(),
            };
            assert_eq!(
                ConsoleFormatter::format_outcome(&down, false),
                "Model unavailable: Connection error: refused"
            );
        });
    }

    #[test]
    fn test_tools_listing_marks_optional_parameters() {
        plain(|| {
            let tools: Vec<ToolDefinition> =
                default_tool_spec().sorted().into_iter().cloned().collect();
            let text = ConsoleFormatter::format_tools(&tools);

            assert!(text.contains("create_table(table_name?)"));
            assert!(text.contains("insert_user(name, email)"));
            assert!(text.contains("list_users()"));
        });
    }

    #[test]
    fn test_result_json_carries_outcome() {
        let result = ToolResult::success("create_table", "Table 'users' created successfully.");
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_result_json(&result)).unwrap();
        assert_eq!(json["tool_name"], "create_table");
    }
}
