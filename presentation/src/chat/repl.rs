//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::{ConsoleFormatter, ReplConfig};
use colored::Colorize;
use dbassist_application::{ProcessTurnUseCase, TurnOutcome};
use dbassist_domain::ToolDefinition;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

/// What an input line asks the REPL to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput<'a> {
    Empty,
    Exit,
    Help,
    Tools,
    UnknownCommand(&'a str),
    Request(&'a str),
}

impl<'a> ReplInput<'a> {
    pub fn classify(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplInput::Empty;
        }

        let word = line.strip_prefix('/').unwrap_or(line);
        if word.eq_ignore_ascii_case("exit") || word.eq_ignore_ascii_case("quit") {
            return ReplInput::Exit;
        }

        if line.starts_with('/') {
            return match word {
                "help" | "h" | "?" => ReplInput::Help,
                "tools" => ReplInput::Tools,
                "q" => ReplInput::Exit,
                _ => ReplInput::UnknownCommand(line),
            };
        }

        ReplInput::Request(line)
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: ProcessTurnUseCase,
    model: String,
    tools: Vec<ToolDefinition>,
    config: ReplConfig,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(
        use_case: ProcessTurnUseCase,
        model: impl Into<String>,
        tools: Vec<ToolDefinition>,
    ) -> Self {
        Self {
            use_case,
            model: model.into(),
            tools,
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    fn history_path(&self) -> Option<PathBuf> {
        self.config
            .history_file
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|p| p.join("dbassist").join("history.txt")))
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = self.history_path();
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        let mut warned_lost_channel = false;
        loop {
            match rl.readline(">>> ") {
                Ok(line) => match ReplInput::classify(&line) {
                    ReplInput::Empty => continue,
                    ReplInput::Exit => {
                        println!("Bye!");
                        break;
                    }
                    ReplInput::Help => self.print_help(),
                    ReplInput::Tools => {
                        println!("{}", ConsoleFormatter::format_tools(&self.tools))
                    }
                    ReplInput::UnknownCommand(cmd) => {
                        println!("Unknown command: {}", cmd);
                        println!("Type /help for available commands");
                    }
                    ReplInput::Request(request) => {
                        let _ = rl.add_history_entry(request);
                        let outcome = self.use_case.execute(request).await;
                        println!(
                            "{}",
                            ConsoleFormatter::format_outcome(&outcome, self.config.show_model_reply)
                        );
                        println!();

                        if !warned_lost_channel
                            && outcome.transport_failed()
                            && self.use_case.channel_closed()
                        {
                            self.warn_lost_channel(&outcome);
                            warned_lost_channel = true;
                        }
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn warn_lost_channel(&self, outcome: &TurnOutcome) {
        tracing::warn!(
            "Tool server unreachable: {}",
            outcome.result().map(|r| r.display_text()).unwrap_or_default()
        );
        println!(
            "{}",
            "The tool server is no longer responding. Conversation still works, \
             but commands will fail until dbassist is restarted."
                .yellow()
        );
        println!();
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          dbassist - Database Chat           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model: {}", self.model);
        println!(
            "Tools: {}",
            self.tools
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
        println!("Ask in plain language, e.g. \"add Bob, bob@example.com\".");
        println!("Type /help for commands, exit or quit to leave.");
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /help, /h, /?        - Show this help");
        println!("  /tools               - List the tool server's tools");
        println!("  exit, quit, /q       - Exit chat");
        println!();
        println!("Anything else is sent to the model. Replies containing");
        println!("CMD:CREATE, CMD:INSERT or CMD:LIST are executed.");
        println!();
    }
}
