//! CLI entrypoint for dbassist
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use dbassist_application::ProcessTurnUseCase;
use dbassist_domain::{CommandGrammar, ConfigIssue, ToolCall};
use dbassist_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, LaunchSpec, SqliteUserStore, ToolRegistry,
    ToolServer, ToolSession, build_gateway,
};
use dbassist_presentation::{
    ChatRepl, Cli, Command, ConsoleFormatter, ConsoleOperatorPrompt, OutputFormat, ReplConfig,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Held until exit so buffered file logs are flushed
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    apply_overrides(&mut config, &cli);

    let command = cli.selected_command();

    // The tool server has no use for model settings
    let issues = match command {
        Command::Serve => config.store.validate(),
        _ => config.validate(),
    };
    report_issues(&issues);
    if FileConfig::has_errors(&issues) {
        bail!("Invalid configuration");
    }

    info!("Starting dbassist ({:?})", command);

    match command {
        Command::Serve => run_serve(&config).await,
        Command::Chat => run_chat(&cli, &config).await,
        Command::Call { tool, args, output } => run_call(&cli, &config, &tool, &args, output).await,
        Command::Tools { output } => run_tools(&cli, &config, output).await,
    }
}

/// Log to stderr at the `-v` level, and to `log_file` as well when given.
///
/// stdout is reserved: in `serve` mode it carries the protocol stream.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(db) = &cli.db {
        config.store.path = db.clone();
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(provider) = &cli.provider {
        config.llm.provider = provider.clone();
    }
}

fn report_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        eprintln!("{}", ConsoleFormatter::format_issue(issue));
    }
}

/// Launch line for the tool server.
///
/// When the server is this binary, it is handed the same config source,
/// database and verbosity so both processes agree on the store.
fn launch_spec(cli: &Cli, config: &FileConfig) -> Result<LaunchSpec> {
    let mut spec = config.session.launch_spec()?;

    if config.session.command.is_none() {
        if cli.no_config {
            spec = spec.with_arg("--no-config");
        } else if let Some(path) = &cli.config {
            spec = spec.with_arg("--config").with_arg(path.display().to_string());
        }
        spec = spec
            .with_arg("--db")
            .with_arg(config.store.path.display().to_string());
        if cli.verbose > 0 {
            spec = spec.with_arg(format!("-{}", "v".repeat(cli.verbose as usize)));
        }
    }

    Ok(spec)
}

async fn open_session(cli: &Cli, config: &FileConfig) -> Result<ToolSession> {
    let spec = launch_spec(cli, config)?;
    ToolSession::open(&spec, config.session.options())
        .await
        .with_context(|| format!("Failed to open tool session with `{}`", spec))
}

async fn run_serve(config: &FileConfig) -> Result<ExitCode> {
    let (table, _) = config.store.parse_users_table();
    let store = SqliteUserStore::new(&config.store.path)
        .with_busy_timeout(config.store.busy_timeout());

    info!(
        db = %config.store.path.display(),
        table = %table,
        "Serving user tools on stdio"
    );

    let registry = ToolRegistry::with_user_tools(Arc::new(store), table);
    ToolServer::new(Arc::new(registry)).serve_stdio().await?;
    Ok(ExitCode::SUCCESS)
}

async fn run_chat(cli: &Cli, config: &FileConfig) -> Result<ExitCode> {
    let gateway = build_gateway(&config.llm)?;
    let session = Arc::new(open_session(cli, config).await?);

    let grammar = CommandGrammar::new().with_interactive_insert(config.grammar.interactive_insert);
    let mut use_case = ProcessTurnUseCase::new(Arc::clone(&gateway), session.clone())
        .with_grammar(grammar)
        .with_operator_prompt(Arc::new(ConsoleOperatorPrompt::new()));

    if let Some(path) = &config.logging.conversation_log {
        let logger = JsonlConversationLogger::open(path)
            .with_context(|| format!("Failed to open conversation log {}", path))?;
        info!("Conversation log: {}", logger.path().display());
        use_case = use_case.with_conversation_logger(Arc::new(logger));
    }

    let repl = ChatRepl::new(use_case, gateway.model(), session.tools().to_vec()).with_config(
        ReplConfig {
            show_model_reply: config.repl.show_model_reply,
            history_file: config.repl.history_file.clone(),
        },
    );
    let result = repl.run().await;

    // The REPL's use case holds the other reference to the session
    drop(repl);
    match Arc::try_unwrap(session) {
        Ok(session) => session.close().await,
        Err(_) => warn!("Tool session still in use at exit; dropping it"),
    }

    result?;
    Ok(ExitCode::SUCCESS)
}

async fn run_call(
    cli: &Cli,
    config: &FileConfig,
    tool: &str,
    args: &[String],
    output: OutputFormat,
) -> Result<ExitCode> {
    let call = args
        .iter()
        .try_fold(ToolCall::new(tool), |call, arg| call.with_assignment(arg))?;

    let session = open_session(cli, config).await?;
    let result = session.invoke(&call).await;
    session.close().await;

    match output {
        OutputFormat::Text => println!("{}", ConsoleFormatter::format_result(&result)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_result_json(&result)),
    }

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_tools(cli: &Cli, config: &FileConfig, output: OutputFormat) -> Result<ExitCode> {
    let session = open_session(cli, config).await?;
    let tools = session.tools().to_vec();
    info!(
        "Tool server: {} {}",
        session.server_info().name,
        session.server_info().version
    );
    session.close().await;

    match output {
        OutputFormat::Text => print!("{}", ConsoleFormatter::format_tools(&tools)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_tools_json(&tools)),
    }
    Ok(ExitCode::SUCCESS)
}
