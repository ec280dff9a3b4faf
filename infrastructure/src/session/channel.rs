//! Client side of the tool session.
//!
//! [`ToolSession`] owns the tool server child (if it spawned one), performs
//! the `initialize` → `notifications/initialized` → `tools/list` handshake,
//! and then turns [`ToolCall`]s into `tools/call` requests. It implements
//! [`ToolChannelPort`] for the application layer.

use crate::rpc::error::{Result, SessionError};
use crate::rpc::protocol::{
    InitializeParams, InitializeResult, JsonRpcNotification, JsonRpcRequest, PROTOCOL_VERSION,
    PeerInfo, ToolsCallParams, ToolsCallResult, ToolsListResult, methods,
};
use crate::session::launch::LaunchSpec;
use crate::session::router::MessageRouter;
use crate::tools::schema::JsonSchemaToolConverter;
use async_trait::async_trait;
use dbassist_application::ports::tool_channel::ToolChannelPort;
use dbassist_domain::tool::entities::{ToolCall, ToolDefinition};
use dbassist_domain::tool::value_objects::{ToolError, ToolResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Child;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// How long `close` waits for the server to exit before killing it
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Timeouts and client identity for a session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub handshake_timeout: Duration,
    pub invoke_timeout: Duration,
    pub client_info: PeerInfo,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(10),
            invoke_timeout: Duration::from_secs(30),
            client_info: PeerInfo::new("dbassist", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// An open session with a tool server.
pub struct ToolSession {
    router: Arc<MessageRouter>,
    /// Tool server child process (killed on Drop to prevent orphans).
    child: Option<Child>,
    server_info: PeerInfo,
    tools: Vec<ToolDefinition>,
    /// One invocation in flight at a time
    invoke_lock: Mutex<()>,
    options: SessionOptions,
}

impl ToolSession {
    /// Spawn the tool server described by `spec` and handshake with it.
    pub async fn open(spec: &LaunchSpec, options: SessionOptions) -> Result<Self> {
        info!("Starting tool server: {}", spec);

        let mut child = spec
            .command()
            .spawn()
            .map_err(|e| SessionError::SpawnError(format!("{}: {}", spec.program.display(), e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SessionError::SpawnError("Failed to capture stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SessionError::SpawnError("Failed to capture stdout".into()))?;

        let router = MessageRouter::start(stdout, stdin);
        match Self::handshake(&router, &options).await {
            Ok((server_info, tools)) => Ok(Self {
                router,
                child: Some(child),
                server_info,
                tools,
                invoke_lock: Mutex::new(()),
                options,
            }),
            Err(e) => {
                let _ = child.start_kill();
                Err(e)
            }
        }
    }

    /// Handshake over an already-connected stream pair.
    pub async fn connect<R, W>(reader: R, writer: W, options: SessionOptions) -> Result<Self>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let router = MessageRouter::start(reader, writer);
        let (server_info, tools) = Self::handshake(&router, &options).await?;
        Ok(Self {
            router,
            child: None,
            server_info,
            tools,
            invoke_lock: Mutex::new(()),
            options,
        })
    }

    async fn handshake(
        router: &MessageRouter,
        options: &SessionOptions,
    ) -> Result<(PeerInfo, Vec<ToolDefinition>)> {
        let handshake_error = |e: SessionError| match e {
            SessionError::Timeout(detail) => SessionError::Timeout(detail),
            other => SessionError::Handshake(other.to_string()),
        };

        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            client_info: options.client_info.clone(),
            capabilities: serde_json::json!({}),
        };
        let request = JsonRpcRequest::new(methods::INITIALIZE, Some(serde_json::to_value(&params)?));
        let value = router
            .request_with_timeout(&request, options.handshake_timeout)
            .await
            .map_err(handshake_error)?;
        let init: InitializeResult = serde_json::from_value(value)
            .map_err(|e| SessionError::Handshake(format!("bad initialize result: {}", e)))?;

        if init.protocol_version != PROTOCOL_VERSION {
            warn!(
                "Tool server speaks protocol {} (client expects {})",
                init.protocol_version, PROTOCOL_VERSION
            );
        }

        router
            .notify(&JsonRpcNotification::new(methods::INITIALIZED))
            .await
            .map_err(handshake_error)?;

        let request = JsonRpcRequest::new(methods::TOOLS_LIST, None);
        let value = router
            .request_with_timeout(&request, options.handshake_timeout)
            .await
            .map_err(handshake_error)?;
        let listed: ToolsListResult = serde_json::from_value(value)
            .map_err(|e| SessionError::Handshake(format!("bad tools/list result: {}", e)))?;

        let tools: Vec<ToolDefinition> = listed
            .tools
            .iter()
            .map(JsonSchemaToolConverter::from_descriptor)
            .collect();

        info!(
            "Connected to {} {} ({} tools)",
            init.server_info.name,
            init.server_info.version,
            tools.len()
        );
        Ok((init.server_info, tools))
    }

    pub fn server_info(&self) -> &PeerInfo {
        &self.server_info
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Whether the server side has gone away.
    pub fn is_closed(&self) -> bool {
        self.router.is_closed()
    }

    /// Invoke a tool using the session's default timeout.
    pub async fn invoke(&self, call: &ToolCall) -> ToolResult {
        self.invoke_with_timeout(call, self.options.invoke_timeout)
            .await
    }

    /// Invoke a tool, giving up after `timeout`.
    ///
    /// Never returns an error: transport problems become `Transport`
    /// failures of the result.
    pub async fn invoke_with_timeout(&self, call: &ToolCall, timeout: Duration) -> ToolResult {
        let _guard = self.invoke_lock.lock().await;
        let start = Instant::now();

        debug!("Invoking tool: {} {:?}", call.tool_name, call.arguments);

        let params = ToolsCallParams {
            name: call.tool_name.clone(),
            arguments: call.arguments.clone(),
        };
        let params = match serde_json::to_value(&params) {
            Ok(p) => p,
            Err(e) => {
                return ToolResult::failure(
                    &call.tool_name,
                    ToolError::validation(format!("Cannot encode arguments: {}", e)),
                );
            }
        };

        let request = JsonRpcRequest::new(methods::TOOLS_CALL, Some(params));
        let result = match self.router.request_with_timeout(&request, timeout).await {
            Ok(value) => match serde_json::from_value::<ToolsCallResult>(value) {
                Ok(call_result) => call_result.into_tool_result(&call.tool_name),
                Err(e) => ToolResult::failure(
                    &call.tool_name,
                    ToolError::transport(format!("Malformed tools/call result: {}", e)),
                ),
            },
            Err(e) => ToolResult::failure(&call.tool_name, Self::transport_failure(e)),
        };

        if result.metadata.duration_ms.is_none() {
            return result.with_duration(start.elapsed().as_millis() as u64);
        }
        result
    }

    fn transport_failure(error: SessionError) -> ToolError {
        match error {
            SessionError::Timeout(detail) => ToolError::timeout(detail),
            SessionError::TransportClosed => {
                ToolError::transport("Tool server connection closed")
            }
            other => ToolError::transport(other.to_string()),
        }
    }

    #[cfg(test)]
    pub(crate) fn router_for_tests(&self) -> &MessageRouter {
        &self.router
    }

    /// Liveness check.
    pub async fn ping(&self) -> Result<()> {
        let request = JsonRpcRequest::new(methods::PING, None);
        self.router
            .request_with_timeout(&request, self.options.handshake_timeout)
            .await
            .map(|_| ())
    }

    /// Ask the server to shut down, then reap (or kill) the child.
    pub async fn close(mut self) {
        if let Err(e) = self
            .router
            .notify(&JsonRpcNotification::new(methods::SHUTDOWN))
            .await
        {
            debug!("Shutdown notification not delivered: {}", e);
        }
        self.router.close_writer().await;

        if let Some(mut child) = self.child.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
                Ok(Ok(status)) => debug!("Tool server exited: {}", status),
                Ok(Err(e)) => warn!("Failed to wait for tool server: {}", e),
                Err(_) => {
                    warn!("Tool server did not exit in time, killing it");
                    let _ = child.kill().await;
                }
            }
        }
    }
}

impl Drop for ToolSession {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            debug!("ToolSession dropping, killing tool server child process");
            let _ = child.start_kill();
        }
    }
}

#[async_trait]
impl ToolChannelPort for ToolSession {
    fn tools(&self) -> &[ToolDefinition] {
        ToolSession::tools(self)
    }

    fn is_closed(&self) -> bool {
        ToolSession::is_closed(self)
    }

    async fn invoke(&self, call: &ToolCall) -> ToolResult {
        ToolSession::invoke(self, call).await
    }
}
