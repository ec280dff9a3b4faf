//! Tool server: answers session requests over one byte stream.
//!
//! Requests are processed one at a time in arrival order. Tool failures are
//! reported inside the `tools/call` result; JSON-RPC errors are reserved for
//! unparseable frames, unknown methods and bad parameters.

use crate::rpc::error::Result;
use crate::rpc::framing::{FrameReader, write_message};
use crate::rpc::protocol::{
    IncomingMessage, InitializeResult, JsonRpcResponseOut, PROTOCOL_VERSION, PeerInfo, RpcError,
    ToolsCallParams, ToolsCallResult, ToolsListResult, error_codes, methods,
};
use crate::rpc::transport::{MessageKind, classify_message};
use crate::tools::schema::JsonSchemaToolConverter;
use dbassist_application::ports::tool_executor::ToolExecutorPort;
use dbassist_domain::tool::entities::ToolCall;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tracing::{debug, info, warn};

/// What the serve loop should do after handling a message
enum Flow {
    Continue,
    Stop,
}

/// Serves the registered tools to one client.
pub struct ToolServer {
    executor: Arc<dyn ToolExecutorPort>,
    info: PeerInfo,
}

impl ToolServer {
    pub fn new(executor: Arc<dyn ToolExecutorPort>) -> Self {
        Self {
            executor,
            info: PeerInfo::new("dbassist-tools", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn info(&self) -> &PeerInfo {
        &self.info
    }

    /// Serve on the process's own stdin/stdout.
    pub async fn serve_stdio(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve until the client closes the stream or sends `shutdown`.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            "Tool server ready ({} tools)",
            self.executor.tool_spec().len()
        );
        let mut frames = FrameReader::new(BufReader::new(reader));

        while let Some(body) = frames.read_frame().await? {
            let json: serde_json::Value = match serde_json::from_slice(&body) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Unparseable request: {}", e);
                    let error = RpcError::new(error_codes::PARSE_ERROR, format!("Parse error: {}", e));
                    write_message(&mut writer, &JsonRpcResponseOut::error(None, error)).await?;
                    continue;
                }
            };

            let flow = match classify_message(&json) {
                MessageKind::Request { id } => {
                    let (response, flow) = self.handle_request(id, json).await;
                    write_message(&mut writer, &response).await?;
                    flow
                }
                MessageKind::Notification => self.handle_notification(&json),
                MessageKind::Response { id } => {
                    debug!("Ignoring unexpected response id={}", id);
                    Flow::Continue
                }
                MessageKind::Invalid => {
                    let error = RpcError::new(error_codes::INVALID_REQUEST, "Invalid request");
                    write_message(&mut writer, &JsonRpcResponseOut::error(None, error)).await?;
                    Flow::Continue
                }
            };

            if let Flow::Stop = flow {
                break;
            }
        }

        info!("Tool server stopping");
        Ok(())
    }

    fn handle_notification(&self, json: &serde_json::Value) -> Flow {
        match json.get("method").and_then(|m| m.as_str()) {
            Some(methods::SHUTDOWN) => {
                debug!("Shutdown requested");
                Flow::Stop
            }
            Some(methods::INITIALIZED) => {
                debug!("Client initialized");
                Flow::Continue
            }
            Some(other) => {
                debug!("Ignoring notification: {}", other);
                Flow::Continue
            }
            None => Flow::Continue,
        }
    }

    async fn handle_request(&self, id: u64, json: serde_json::Value) -> (JsonRpcResponseOut, Flow) {
        let message: IncomingMessage = match serde_json::from_value(json) {
            Ok(m) => m,
            Err(e) => {
                let error = RpcError::new(error_codes::INVALID_REQUEST, e.to_string());
                return (JsonRpcResponseOut::error(Some(id), error), Flow::Continue);
            }
        };

        debug!("Request id={} method={}", id, message.method);

        let result = match message.method.as_str() {
            methods::INITIALIZE => self.initialize(),
            methods::TOOLS_LIST => self.tools_list(),
            methods::TOOLS_CALL => self.tools_call(message.params).await,
            methods::PING => Ok(serde_json::json!({})),
            methods::SHUTDOWN => {
                return (
                    JsonRpcResponseOut::new(id, serde_json::json!({})),
                    Flow::Stop,
                );
            }
            other => Err(RpcError::method_not_found(other)),
        };

        let response = match result {
            Ok(value) => JsonRpcResponseOut::new(id, value),
            Err(error) => JsonRpcResponseOut::error(Some(id), error),
        };
        (response, Flow::Continue)
    }

    fn initialize(&self) -> std::result::Result<serde_json::Value, RpcError> {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: self.info.clone(),
            capabilities: serde_json::json!({ "tools": {} }),
        };
        serde_json::to_value(result).map_err(internal_error)
    }

    fn tools_list(&self) -> std::result::Result<serde_json::Value, RpcError> {
        let result = ToolsListResult {
            tools: JsonSchemaToolConverter::descriptors(self.executor.tool_spec()),
        };
        serde_json::to_value(result).map_err(internal_error)
    }

    async fn tools_call(
        &self,
        params: Option<serde_json::Value>,
    ) -> std::result::Result<serde_json::Value, RpcError> {
        let params: ToolsCallParams = params
            .ok_or_else(|| RpcError::new(error_codes::INVALID_PARAMS, "Missing params"))
            .and_then(|p| {
                serde_json::from_value(p).map_err(|e| {
                    RpcError::new(error_codes::INVALID_PARAMS, format!("Invalid params: {}", e))
                })
            })?;

        let call = ToolCall {
            tool_name: params.name,
            arguments: params.arguments,
        };
        let result = self.executor.execute(&call).await;
        serde_json::to_value(ToolsCallResult::from(&result)).map_err(internal_error)
    }
}

fn internal_error(e: serde_json::Error) -> RpcError {
    RpcError::new(error_codes::INTERNAL_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::protocol::{JsonRpcNotification, JsonRpcRequest};
    use crate::session::{SessionOptions, ToolSession};
    use crate::store::SqliteUserStore;
    use crate::tools::registry::ToolRegistry;
    use dbassist_application::ports::tool_channel::ToolChannelPort;
    use dbassist_domain::store::TableName;
    use dbassist_domain::tool::value_objects::FailureKind;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex, split};

    fn spawn_server(db: &std::path::Path) -> tokio::io::DuplexStream {
        let store = Arc::new(SqliteUserStore::new(db));
        let registry = Arc::new(ToolRegistry::with_user_tools(store, TableName::parse("users").unwrap()));
        let (client, server) = duplex(64 * 1024);
        tokio::spawn(async move {
            let (read, write) = split(server);
            ToolServer::new(registry).serve(read, write).await.unwrap();
        });
        client
    }

    async fn open_session(db: &std::path::Path) -> ToolSession {
        let (read, write) = split(spawn_server(db));
        ToolSession::connect(read, write, SessionOptions::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn handshake_lists_tools() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir.path().join("users.db")).await;

        assert_eq!(session.server_info().name, "dbassist-tools");
        let mut names: Vec<&str> = session.tools().iter().map(|t| t.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["create_table", "insert_user", "list_users"]);
        session.ping().await.unwrap();
    }

    #[tokio::test]
    async fn create_insert_list_over_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir.path().join("users.db")).await;

        let created = session
            .invoke(&ToolCall::new("create_table").with_arg("table_name", "users"))
            .await;
        assert!(created.is_success(), "{:?}", created);
        assert_eq!(created.output(), Some("Table 'users' created successfully."));

        let inserted = session
            .invoke(
                &ToolCall::new("insert_user")
                    .with_arg("name", "Bob")
                    .with_arg("email", "bob@x.com"),
            )
            .await;
        assert!(inserted.is_success());
        assert_eq!(inserted.metadata.rows_affected, Some(1));

        let listed = session.invoke(&ToolCall::new("get_users")).await;
        assert!(listed.is_success());
        assert!(listed.output().unwrap().contains("ID: 1, Name: Bob, Email: bob@x.com"));
        assert_eq!(listed.metadata.row_count, Some(1));
        assert!(listed.metadata.duration_ms.is_some());

        let duplicate = session
            .invoke(
                &ToolCall::new("insert_user")
                    .with_arg("name", "Robert")
                    .with_arg("email", "bob@x.com"),
            )
            .await;
        assert_eq!(duplicate.failure_kind(), Some(FailureKind::Constraint));

        session.close().await;
    }

    #[tokio::test]
    async fn unknown_tool_is_a_failed_result_not_an_rpc_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir.path().join("users.db")).await;

        let result = session.invoke(&ToolCall::new("drop_table")).await;
        assert_eq!(result.failure_kind(), Some(FailureKind::Validation));
        assert!(!session.is_closed());
    }

    #[tokio::test]
    async fn closed_server_yields_transport_failure() {
        let dir = tempfile::tempdir().unwrap();
        let session = open_session(&dir.path().join("users.db")).await;

        // Stop the server behind the session's back
        session
            .router_for_tests()
            .notify(&JsonRpcNotification::new(methods::SHUTDOWN))
            .await
            .unwrap();

        let result = session
            .invoke_with_timeout(&ToolCall::new("list_users"), Duration::from_secs(5))
            .await;
        assert_eq!(result.failure_kind(), Some(FailureKind::Transport));

        let channel: &dyn ToolChannelPort = &session;
        tokio::time::timeout(Duration::from_secs(5), async {
            while !channel.is_closed() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("router should observe end of stream");
    }

    #[tokio::test]
    async fn unanswered_handshake_times_out() {
        let (client, _server) = duplex(4096);
        let (read, write) = split(client);
        let options = SessionOptions {
            handshake_timeout: Duration::from_millis(50),
            ..SessionOptions::default()
        };
        let err = ToolSession::connect(read, write, options)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, crate::rpc::error::SessionError::Timeout(_)));
    }

    #[tokio::test]
    async fn unknown_method_and_garbage_get_rpc_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (mut read, mut write) = split(spawn_server(&dir.path().join("users.db")));

        write_message(&mut write, &JsonRpcRequest::new("bogus/method", None))
            .await
            .unwrap();
        let body = b"not json";
        write
            .write_all(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes())
            .await
            .unwrap();
        write.write_all(body).await.unwrap();
        write_message(&mut write, &JsonRpcNotification::new(methods::SHUTDOWN))
            .await
            .unwrap();

        let mut raw = Vec::new();
        read.read_to_end(&mut raw).await.unwrap();
        let mut frames = FrameReader::new(BufReader::new(&raw[..]));

        let first: serde_json::Value =
            serde_json::from_slice(&frames.read_frame().await.unwrap().unwrap()).unwrap();
        assert_eq!(first["error"]["code"], error_codes::METHOD_NOT_FOUND);

        let second: serde_json::Value =
            serde_json::from_slice(&frames.read_frame().await.unwrap().unwrap()).unwrap();
        assert_eq!(second["error"]["code"], error_codes::PARSE_ERROR);
        assert!(second["id"].is_null());

        assert!(frames.read_frame().await.unwrap().is_none());
    }
}
