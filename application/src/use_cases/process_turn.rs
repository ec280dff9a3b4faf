//! Process Turn use case.
//!
//! One pass of the interactive loop after the operator has typed a line:
//!
//! ```text
//! operator text ─▶ LlmGateway::complete ─▶ reply
//!                                           │
//!                                   CommandGrammar::classify
//!        ┌──────────────┬───────────────┬───┴──────────────┐
//!    NoCommand     Malformed   InsertNeedsDetails       Command
//!        │              │               │ (ask operator)    │
//!  Conversational   Malformed           └───────────▶ ToolChannelPort::invoke
//!                                                           │
//!                                                        Executed
//! ```
//!
//! No step returns an error: every failure is folded into a [`TurnOutcome`]
//! so the loop can print it and move on.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, events,
};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::operator_prompt::{NoOperatorPrompt, OperatorPrompt, OperatorPromptError};
use crate::ports::tool_channel::ToolChannelPort;
use dbassist_domain::core::text::preview;
use dbassist_domain::{
    Command, CommandGrammar, FailureKind, ParseOutcome, PromptTemplate, ToolKind, ToolResult,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened during one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The reply carried no command; display it as conversation
    Conversational { reply: String },
    /// A command was sent through the channel
    Executed {
        reply: String,
        command: Command,
        result: ToolResult,
    },
    /// A marker was present but its arguments were unusable
    Malformed {
        reply: String,
        kind: ToolKind,
        reason: String,
    },
    /// The operator declined to supply insert details
    Cancelled { reply: String },
    /// The model call failed; the turn produced no reply
    ModelUnavailable { error: String },
    /// The model answered with nothing but whitespace
    EmptyReply,
}

impl TurnOutcome {
    /// The model reply, if one was obtained
    pub fn reply(&self) -> Option<&str> {
        match self {
            TurnOutcome::Conversational { reply }
            | TurnOutcome::Executed { reply, .. }
            | TurnOutcome::Malformed { reply, .. }
            | TurnOutcome::Cancelled { reply } => Some(reply),
            TurnOutcome::ModelUnavailable { .. } | TurnOutcome::EmptyReply => None,
        }
    }

    /// The tool result, if a command was executed
    pub fn result(&self) -> Option<&ToolResult> {
        match self {
            TurnOutcome::Executed { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Whether the tool server could not be reached during this turn
    pub fn transport_failed(&self) -> bool {
        self.result()
            .and_then(ToolResult::failure_kind)
            .is_some_and(|kind| kind == FailureKind::Transport)
    }
}

/// Use case for processing one operator turn.
pub struct ProcessTurnUseCase {
    gateway: Arc<dyn LlmGateway>,
    channel: Arc<dyn ToolChannelPort>,
    grammar: CommandGrammar,
    system_prompt: String,
    operator_prompt: Arc<dyn OperatorPrompt>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl ProcessTurnUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, channel: Arc<dyn ToolChannelPort>) -> Self {
        let system_prompt = PromptTemplate::system_with_tools(channel.tools());
        Self {
            gateway,
            channel,
            grammar: CommandGrammar::new(),
            system_prompt,
            operator_prompt: Arc::new(NoOperatorPrompt),
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_grammar(mut self, grammar: CommandGrammar) -> Self {
        self.grammar = grammar;
        self
    }

    /// Prompt used to ask the operator for missing insert details.
    pub fn with_operator_prompt(mut self, prompt: Arc<dyn OperatorPrompt>) -> Self {
        self.operator_prompt = prompt;
        self
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Whether the tool server has gone away for good.
    ///
    /// A timed-out invocation also fails with a transport error, but the
    /// server may still answer later requests.
    pub fn channel_closed(&self) -> bool {
        self.channel.is_closed()
    }

    /// Run one turn for the operator's input line.
    pub async fn execute(&self, input: &str) -> TurnOutcome {
        self.conversation_logger.log(ConversationEvent::new(
            events::OPERATOR_INPUT,
            serde_json::json!({ "text": input }),
        ));

        let user_prompt = PromptTemplate::user_request(input);
        let reply = match self.gateway.complete(&self.system_prompt, &user_prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Model call failed: {}", e);
                self.conversation_logger.log(ConversationEvent::new(
                    events::MODEL_UNAVAILABLE,
                    serde_json::json!({
                        "model": self.gateway.model(),
                        "error": e.to_string(),
                    }),
                ));
                return TurnOutcome::ModelUnavailable {
                    error: e.to_string(),
                };
            }
        };

        self.conversation_logger.log(ConversationEvent::new(
            events::MODEL_REPLY,
            serde_json::json!({
                "model": self.gateway.model(),
                "text": reply,
            }),
        ));

        if reply.trim().is_empty() {
            warn!("Model {} returned an empty reply", self.gateway.model());
            return TurnOutcome::EmptyReply;
        }

        match self.grammar.classify(&reply) {
            ParseOutcome::NoCommand => {
                debug!("Conversational reply: {}", preview(&reply, 80));
                TurnOutcome::Conversational { reply }
            }
            ParseOutcome::Malformed { kind, reason } => {
                warn!("Malformed {} command in reply: {}", kind, reason);
                self.log_malformed(kind, &reason, &reply);
                TurnOutcome::Malformed {
                    reply,
                    kind,
                    reason,
                }
            }
            ParseOutcome::InsertNeedsDetails => match self.ask_user_details().await {
                Ok(command) => self.run_command(reply, command).await,
                Err(OperatorPromptError::Cancelled) => {
                    info!("Insert cancelled by operator");
                    TurnOutcome::Cancelled { reply }
                }
                Err(OperatorPromptError::IoError(e)) => {
                    warn!("Could not read insert details: {}", e);
                    TurnOutcome::Cancelled { reply }
                }
            },
            ParseOutcome::Command(command) => self.run_command(reply, command).await,
        }
    }

    /// Send a single command through the channel.
    pub async fn execute_command(&self, command: &Command) -> ToolResult {
        let call = command.to_tool_call();
        info!(tool = %call.tool_name, "Dispatching {}", command);

        let result = self.channel.invoke(&call).await;

        match result.error() {
            None => debug!(tool = %result.tool_name, "Tool succeeded"),
            Some(err) if err.kind.is_expected() => {
                info!(tool = %result.tool_name, "Tool rejected request: {}", err.message)
            }
            Some(err) => warn!(tool = %result.tool_name, "Tool failed: {}", err),
        }

        self.conversation_logger.log(ConversationEvent::new(
            events::TOOL_RESULT,
            serde_json::json!({
                "tool": result.tool_name,
                "success": result.is_success(),
                "failure_kind": result.failure_kind().map(|k| k.as_str()),
                "text": result.display_text(),
                "duration_ms": result.metadata.duration_ms,
            }),
        ));

        result
    }

    async fn run_command(&self, reply: String, command: Command) -> TurnOutcome {
        self.conversation_logger.log(ConversationEvent::new(
            events::COMMAND_PARSED,
            serde_json::to_value(&command).unwrap_or_default(),
        ));

        let result = self.execute_command(&command).await;
        TurnOutcome::Executed {
            reply,
            command,
            result,
        }
    }

    async fn ask_user_details(&self) -> Result<Command, OperatorPromptError> {
        let name = self.operator_prompt.ask("Name").await?;
        let name = name.trim();
        if name.is_empty() {
            return Err(OperatorPromptError::Cancelled);
        }

        let email = self.operator_prompt.ask("Email").await?;
        let email = email.trim();
        if email.is_empty() {
            return Err(OperatorPromptError::Cancelled);
        }

        Ok(Command::insert_user(name, email))
    }

    fn log_malformed(&self, kind: ToolKind, reason: &str, reply: &str) {
        self.conversation_logger.log(ConversationEvent::new(
            events::COMMAND_MALFORMED,
            serde_json::json!({
                "kind": kind.name(),
                "reason": reason,
                "text": reply,
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use async_trait::async_trait;
    use dbassist_domain::{ToolCall, ToolDefinition, ToolError, default_tool_spec};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // ==================== Test doubles ====================

    /// Gateway returning scripted replies in order
    struct ScriptedGateway {
        replies: Mutex<VecDeque<Result<String, GatewayError>>>,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedGateway {
        fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn reply(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, system: &str, user: &str) -> Result<String, GatewayError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    /// Channel that records calls and answers with a fixed result
    struct RecordingChannel {
        tools: Vec<ToolDefinition>,
        calls: Mutex<Vec<ToolCall>>,
        failure: Option<ToolError>,
        closed: bool,
    }

    impl RecordingChannel {
        fn ok() -> Self {
            Self {
                tools: default_tool_spec().sorted().into_iter().cloned().collect(),
                calls: Mutex::new(Vec::new()),
                failure: None,
                closed: false,
            }
        }

        fn failing(error: ToolError) -> Self {
            Self {
                failure: Some(error),
                ..Self::ok()
            }
        }

        fn closed() -> Self {
            Self {
                closed: true,
                ..Self::failing(ToolError::transport("Tool server connection closed"))
            }
        }

        fn calls(&self) -> Vec<ToolCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ToolChannelPort for RecordingChannel {
        fn tools(&self) -> &[ToolDefinition] {
            &self.tools
        }

        fn is_closed(&self) -> bool {
            self.closed
        }

        async fn invoke(&self, call: &ToolCall) -> ToolResult {
            self.calls.lock().unwrap().push(call.clone());
            match &self.failure {
                Some(err) => ToolResult::failure(&call.tool_name, err.clone()),
                None => ToolResult::success(&call.tool_name, "ok"),
            }
        }
    }

    /// Operator prompt answering from a script
    struct ScriptedPrompt {
        answers: Mutex<VecDeque<String>>,
        asked: Mutex<Vec<String>>,
    }

    impl ScriptedPrompt {
        fn new(answers: &[&str]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl OperatorPrompt for ScriptedPrompt {
        async fn ask(&self, label: &str) -> Result<String, OperatorPromptError> {
            self.asked.lock().unwrap().push(label.to_string());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(OperatorPromptError::Cancelled)
        }
    }

    /// Logger collecting event types
    #[derive(Default)]
    struct CollectingLogger {
        events: Mutex<Vec<&'static str>>,
    }

    impl ConversationLogger for CollectingLogger {
        fn log(&self, event: ConversationEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    fn use_case(gateway: ScriptedGateway, channel: Arc<RecordingChannel>) -> ProcessTurnUseCase {
        ProcessTurnUseCase::new(Arc::new(gateway), channel)
    }

    // ==================== Routing ====================

    #[tokio::test]
    async fn test_conversational_reply_does_not_invoke_channel() {
        let channel = Arc::new(RecordingChannel::ok());
        let uc = use_case(ScriptedGateway::reply("Hello, how can I help?"), channel.clone());

        let outcome = uc.execute("hi").await;

        assert_eq!(
            outcome,
            TurnOutcome::Conversational {
                reply: "Hello, how can I help?".to_string()
            }
        );
        assert!(channel.calls().is_empty());
    }

    #[tokio::test]
    async fn test_insert_command_is_dispatched() {
        let channel = Arc::new(RecordingChannel::ok());
        let uc = use_case(
            ScriptedGateway::reply(r#"I think you should CMD:INSERT name="Bob" email="bob@x.com""#),
            channel.clone(),
        );

        let outcome = uc.execute("add bob").await;

        let calls = channel.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_name, "insert_user");
        assert_eq!(calls[0].get_string("email"), Some("bob@x.com"));
        match outcome {
            TurnOutcome::Executed {
                command, result, ..
            } => {
                assert_eq!(command, Command::insert_user("Bob", "bob@x.com"));
                assert!(result.is_success());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_users_table() {
        let channel = Arc::new(RecordingChannel::ok());
        let uc = use_case(ScriptedGateway::reply("CMD:CREATE"), channel.clone());

        uc.execute("make the table").await;

        assert_eq!(channel.calls()[0].get_string("table_name"), Some("users"));
    }

    #[tokio::test]
    async fn test_malformed_insert_is_reported_without_invocation() {
        let channel = Arc::new(RecordingChannel::ok());
        let logger = Arc::new(CollectingLogger::default());
        let uc = use_case(ScriptedGateway::reply(r#"CMD:INSERT name="Bob""#), channel.clone())
            .with_conversation_logger(logger.clone());

        let outcome = uc.execute("add bob").await;

        assert!(matches!(
            outcome,
            TurnOutcome::Malformed {
                kind: ToolKind::InsertUser,
                ..
            }
        ));
        assert!(channel.calls().is_empty());
        assert!(logger.events.lock().unwrap().contains(&"command_malformed"));
    }

    // ==================== Interactive insert ====================

    #[tokio::test]
    async fn test_insert_intent_prompts_operator() {
        let channel = Arc::new(RecordingChannel::ok());
        let prompt = Arc::new(ScriptedPrompt::new(&["Alice", "alice@x.com"]));
        let uc = use_case(ScriptedGateway::reply("CMD:INSERT"), channel.clone())
            .with_operator_prompt(prompt.clone());

        let outcome = uc.execute("add a user").await;

        assert_eq!(*prompt.asked.lock().unwrap(), vec!["Name", "Email"]);
        assert!(matches!(outcome, TurnOutcome::Executed { .. }));
        assert_eq!(channel.calls()[0].get_string("name"), Some("Alice"));
    }

    #[tokio::test]
    async fn test_empty_operator_answer_cancels() {
        let channel = Arc::new(RecordingChannel::ok());
        let prompt = Arc::new(ScriptedPrompt::new(&["Alice", "  "]));
        let uc = use_case(ScriptedGateway::reply("INSERT_USER"), channel.clone())
            .with_operator_prompt(prompt);

        let outcome = uc.execute("add a user").await;

        assert!(matches!(outcome, TurnOutcome::Cancelled { .. }));
        assert!(channel.calls().is_empty());
    }

    #[tokio::test]
    async fn test_insert_intent_without_prompt_is_cancelled() {
        let channel = Arc::new(RecordingChannel::ok());
        let uc = use_case(ScriptedGateway::reply("CMD:INSERT"), channel.clone());

        let outcome = uc.execute("add a user").await;

        assert!(matches!(outcome, TurnOutcome::Cancelled { .. }));
        assert!(channel.calls().is_empty());
    }

    // ==================== Failures ====================

    #[tokio::test]
    async fn test_model_failure_is_recoverable() {
        let channel = Arc::new(RecordingChannel::ok());
        let uc = use_case(
            ScriptedGateway::new(vec![
                Err(GatewayError::ConnectionError("refused".into())),
                Ok("CMD:LIST".to_string()),
            ]),
            channel.clone(),
        );

        let first = uc.execute("list").await;
        assert!(matches!(first, TurnOutcome::ModelUnavailable { .. }));
        assert!(first.reply().is_none());

        let second = uc.execute("list").await;
        assert!(matches!(second, TurnOutcome::Executed { .. }));
        assert_eq!(channel.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_reply() {
        let channel = Arc::new(RecordingChannel::ok());
        let uc = use_case(ScriptedGateway::reply("   "), channel.clone());

        assert_eq!(uc.execute("?").await, TurnOutcome::EmptyReply);
        assert!(channel.calls().is_empty());
    }

    #[tokio::test]
    async fn test_closed_channel_is_flagged() {
        let uc = use_case(
            ScriptedGateway::reply("CMD:LIST"),
            Arc::new(RecordingChannel::closed()),
        );

        let outcome = uc.execute("list").await;

        assert!(outcome.transport_failed());
        assert!(uc.channel_closed());
        assert_eq!(
            outcome.result().and_then(|r| r.failure_kind()),
            Some(FailureKind::Transport)
        );
    }

    #[tokio::test]
    async fn test_timeout_leaves_channel_open() {
        let channel = Arc::new(RecordingChannel::failing(ToolError::timeout(
            "tools/call (id=3) after 30s",
        )));
        let uc = use_case(ScriptedGateway::reply("CMD:LIST"), channel);

        let outcome = uc.execute("list").await;

        assert!(outcome.transport_failed());
        assert!(!uc.channel_closed());
    }

    // ==================== Prompts & logging ====================

    #[tokio::test]
    async fn test_system_prompt_lists_server_tools() {
        let gateway = Arc::new(ScriptedGateway::reply("ok"));
        let uc = ProcessTurnUseCase::new(gateway.clone(), Arc::new(RecordingChannel::ok()));

        uc.execute("hello").await;

        let prompts = gateway.prompts.lock().unwrap();
        assert!(prompts[0].0.contains("- insert_user:"));
        assert_eq!(prompts[0].1, "User request: hello");
    }

    #[tokio::test]
    async fn test_conversation_events_for_executed_turn() {
        let logger = Arc::new(CollectingLogger::default());
        let uc = use_case(
            ScriptedGateway::reply("CMD:LIST"),
            Arc::new(RecordingChannel::ok()),
        )
        .with_conversation_logger(logger.clone());

        uc.execute("list").await;

        assert_eq!(
            *logger.events.lock().unwrap(),
            vec!["operator_input", "model_reply", "command_parsed", "tool_result"]
        );
    }
}
