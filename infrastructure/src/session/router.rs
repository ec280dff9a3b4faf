//! Request/response correlation for the client side of a tool session.
//!
//! The tool server talks over a single byte stream (child stdio or an
//! in-memory duplex). [`MessageRouter`] runs one background reader task that
//! owns the read half exclusively and fulfils pending requests by id:
//!
//! ```text
//!   request() ──▶ pending[id] = oneshot::Sender ──▶ write frame
//!                                                        │
//!   reader task ◀── frame ◀──────────────────────────────┘
//!       │
//!       └─ Response{id} → pending.remove(id).send(response)
//! ```
//!
//! When the stream ends, every pending sender is dropped so each waiting
//! caller observes a closed channel instead of hanging.

use crate::rpc::error::{Result, SessionError};
use crate::rpc::framing::{FrameReader, write_message};
use crate::rpc::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use crate::rpc::transport::{MessageKind, classify_message};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::sync::{Mutex, RwLock, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;
type PendingMap = Arc<RwLock<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;

/// Client-side message router over one byte stream.
pub struct MessageRouter {
    /// Background reader task handle (aborted on Drop).
    reader_handle: JoinHandle<()>,

    /// Request-response correlation (request_id -> oneshot sender).
    pending_responses: PendingMap,

    /// Writer (serialized writes, independent of reader). `None` once closed.
    writer: Mutex<Option<BoxedWriter>>,

    /// Set by the reader task when the stream ends.
    closed: Arc<AtomicBool>,
}

impl MessageRouter {
    /// Start the background reader and build the router.
    pub fn start<R, W>(reader: R, writer: W) -> Arc<Self>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending_responses: PendingMap = Arc::new(RwLock::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let pending_bg = Arc::clone(&pending_responses);
        let closed_bg = Arc::clone(&closed);
        let reader_handle = tokio::spawn(async move {
            Self::reader_loop(reader, pending_bg, closed_bg).await;
        });

        Arc::new(Self {
            reader_handle,
            pending_responses,
            writer: Mutex::new(Some(Box::new(writer))),
            closed,
        })
    }

    /// Background reader loop, the single owner of the read half.
    ///
    /// Runs until the stream closes or a framing error occurs. Responses are
    /// routed to their pending oneshot; anything else from the server is
    /// logged and dropped.
    async fn reader_loop<R>(reader: R, pending_responses: PendingMap, closed: Arc<AtomicBool>)
    where
        R: AsyncRead + Send + Unpin,
    {
        let mut frames = FrameReader::new(BufReader::new(reader));

        loop {
            let body = match frames.read_frame().await {
                Ok(Some(body)) => body,
                Ok(None) => {
                    debug!("Router: tool server closed the stream");
                    break;
                }
                Err(e) => {
                    warn!("Router: failed to read frame: {}", e);
                    break;
                }
            };

            let json_value: serde_json::Value = match serde_json::from_slice(&body) {
                Ok(v) => v,
                Err(e) => {
                    warn!(
                        "Router: failed to parse JSON: {}: {}",
                        e,
                        String::from_utf8_lossy(&body)
                    );
                    continue;
                }
            };

            match classify_message(&json_value) {
                MessageKind::Response { id } => {
                    let response: JsonRpcResponse = match serde_json::from_value(json_value) {
                        Ok(r) => r,
                        Err(e) => {
                            warn!("Router: failed to parse response: {}", e);
                            continue;
                        }
                    };
                    let sender = {
                        let mut pending = pending_responses.write().await;
                        pending.remove(&id)
                    };
                    match sender {
                        Some(tx) => {
                            let _ = tx.send(response);
                        }
                        None => debug!("Router: no pending receiver for response id={}", id),
                    }
                }
                MessageKind::Request { id } => {
                    debug!("Router: ignoring server-initiated request id={}", id);
                }
                MessageKind::Notification => {
                    trace!("Router: ignoring notification: {}", json_value);
                }
                MessageKind::Invalid => {
                    warn!("Router: unroutable message: {}", json_value);
                }
            }
        }

        // Reader ended: drop all senders so receivers observe a closed channel
        info!("Router: reader loop ended, failing pending requests");
        closed.store(true, Ordering::SeqCst);
        pending_responses.write().await.clear();
    }

    /// Whether the server side of the stream has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send a JSON-RPC request and wait for the correlated response.
    ///
    /// JSON-RPC error responses are returned as [`SessionError::RpcError`].
    pub async fn request(&self, request: &JsonRpcRequest) -> Result<serde_json::Value> {
        let rx = self.register_and_send(request).await?;
        let response = rx.await.map_err(|_| SessionError::TransportClosed)?;
        Self::into_result(response)
    }

    /// Like [`request`](Self::request) but gives up after `timeout`.
    ///
    /// On timeout the pending entry is removed; a late response is dropped
    /// by the reader loop.
    pub async fn request_with_timeout(
        &self,
        request: &JsonRpcRequest,
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        let rx = self.register_and_send(request).await?;
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Self::into_result(response),
            Ok(Err(_)) => Err(SessionError::TransportClosed),
            Err(_) => {
                self.pending_responses.write().await.remove(&request.id);
                Err(SessionError::Timeout(format!(
                    "{} (id={}) after {:?}",
                    request.method, request.id, timeout
                )))
            }
        }
    }

    /// Send a notification (no response expected).
    pub async fn notify(&self, notification: &JsonRpcNotification) -> Result<()> {
        self.send(notification).await
    }

    /// Drop the write half so the server sees end of input.
    pub async fn close_writer(&self) {
        let mut writer = self.writer.lock().await;
        if writer.take().is_some() {
            debug!("Router: writer closed");
        }
    }

    async fn register_and_send(
        &self,
        request: &JsonRpcRequest,
    ) -> Result<oneshot::Receiver<JsonRpcResponse>> {
        let (tx, rx) = oneshot::channel();
        let request_id = request.id;

        {
            let mut pending = self.pending_responses.write().await;
            pending.insert(request_id, tx);
        }

        // The reader may have ended between the insert and now
        if self.is_closed() {
            self.pending_responses.write().await.remove(&request_id);
            return Err(SessionError::TransportClosed);
        }

        if let Err(e) = self.send(request).await {
            // Clean up the pending entry to prevent leaks
            self.pending_responses.write().await.remove(&request_id);
            return Err(e);
        }

        Ok(rx)
    }

    async fn send<T: Serialize>(&self, message: &T) -> Result<()> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(SessionError::TransportClosed)?;
        write_message(writer, message).await.map_err(|e| match e {
            SessionError::Io(io) if io.kind() == std::io::ErrorKind::BrokenPipe => {
                SessionError::TransportClosed
            }
            other => other,
        })
    }

    fn into_result(response: JsonRpcResponse) -> Result<serde_json::Value> {
        if let Some(error) = response.error {
            return Err(SessionError::RpcError {
                code: error.code,
                message: error.message,
            });
        }
        response.result.ok_or_else(|| {
            SessionError::UnexpectedResponse("response has neither result nor error".into())
        })
    }
}

impl Drop for MessageRouter {
    fn drop(&mut self) {
        self.reader_handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::framing::FrameReader;
    use crate::rpc::protocol::{JsonRpcResponseOut, RpcError};
    use tokio::io::{BufReader, duplex, split};

    /// Echo server answering every request with its method name
    async fn echo_server(stream: tokio::io::DuplexStream) {
        let (read, mut write) = split(stream);
        let mut frames = FrameReader::new(BufReader::new(read));
        while let Ok(Some(body)) = frames.read_frame().await {
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            let id = json["id"].as_u64().unwrap();
            let method = json["method"].as_str().unwrap().to_string();
            let response = if method == "fail" {
                JsonRpcResponseOut::error(Some(id), RpcError::method_not_found("fail"))
            } else {
                JsonRpcResponseOut::new(id, serde_json::json!({ "echo": method }))
            };
            write_message(&mut write, &response).await.unwrap();
        }
    }

    #[tokio::test]
    async fn correlates_response_to_request() {
        let (client, server) = duplex(4096);
        tokio::spawn(echo_server(server));
        let (read, write) = split(client);
        let router = MessageRouter::start(read, write);

        let result = router
            .request(&JsonRpcRequest::new("hello", None))
            .await
            .unwrap();
        assert_eq!(result["echo"], "hello");
    }

    #[tokio::test]
    async fn rpc_error_is_surfaced() {
        let (client, server) = duplex(4096);
        tokio::spawn(echo_server(server));
        let (read, write) = split(client);
        let router = MessageRouter::start(read, write);

        let err = router
            .request(&JsonRpcRequest::new("fail", None))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::RpcError { code: -32601, .. }));
    }

    #[tokio::test]
    async fn closed_stream_fails_pending_request() {
        let (client, server) = duplex(4096);
        let (read, write) = split(client);
        let router = MessageRouter::start(read, write);

        // Server reads the request and then goes away without answering
        let server_task = tokio::spawn(async move {
            let (read, _write) = split(server);
            let mut frames = FrameReader::new(BufReader::new(read));
            let _ = frames.read_frame().await;
        });

        let err = router
            .request_with_timeout(&JsonRpcRequest::new("hello", None), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::TransportClosed));
        server_task.await.unwrap();
        assert!(router.is_closed());
    }

    #[tokio::test]
    async fn timeout_removes_pending_entry() {
        let (client, _server) = duplex(4096);
        let (read, write) = split(client);
        let router = MessageRouter::start(read, write);

        let err = router
            .request_with_timeout(
                &JsonRpcRequest::new("slow", None),
                Duration::from_millis(50),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Timeout(_)));
        assert!(router.pending_responses.read().await.is_empty());
    }

    #[tokio::test]
    async fn send_after_close_writer_fails() {
        let (client, _server) = duplex(4096);
        let (read, write) = split(client);
        let router = MessageRouter::start(read, write);

        router.close_writer().await;
        let err = router
            .notify(&JsonRpcNotification::new("shutdown"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::TransportClosed));
    }
}
