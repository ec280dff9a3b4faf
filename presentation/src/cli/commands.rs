//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for one-shot commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// CLI arguments for dbassist
#[derive(Parser, Debug)]
#[command(name = "dbassist")]
#[command(author, version, about = "Natural-language assistant for a small user database")]
#[command(long_about = r#"
dbassist turns plain-language requests into database operations.

Each line you type is sent to a language model. When the reply carries a
command marker (CMD:CREATE, CMD:INSERT, CMD:LIST) the command is executed by
a tool server process over a JSON-RPC session; otherwise the reply is shown
as conversation.

Configuration files are loaded from (in priority order):
1. --config <path>                       Explicit config file
2. ./dbassist.toml or ./.dbassist.toml   Project-level config
3. ~/.config/dbassist/config.toml        Global config
Environment variables DBASSIST_<SECTION>__<KEY> override all files.

Example:
  dbassist
  dbassist --provider openai -m gpt-4o-mini chat
  dbassist call insert_user -a name=Bob -a email=bob@example.com
  dbassist tools
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// SQLite database file (overrides [store] path)
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Model to ask (overrides [llm] model)
    #[arg(short, long, value_name = "MODEL", global = true)]
    pub model: Option<String>,

    /// Model provider: ollama, openai, anthropic, gemini or replicate (overrides [llm] provider)
    #[arg(long, value_name = "PROVIDER", global = true)]
    pub provider: Option<String>,
}

impl Cli {
    /// The selected subcommand; `chat` when none was given
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive chat with the model (default)
    Chat,

    /// Run the tool server on stdin/stdout
    Serve,

    /// Invoke one tool through a fresh session and print the result
    Call {
        /// Tool name (e.g. create_table, insert_user, list_users)
        tool: String,

        /// Tool argument as key=value (repeatable)
        #[arg(short = 'a', long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List the tools the server exposes
    Tools {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}
