//! Message classification for the session reader loops.
//!
//! Both the client router and the tool server read a stream of frames and
//! must decide what each one is before deserializing it further.

/// Classification of an incoming JSON-RPC message.
///
/// - `Response` → oneshot correlation for pending requests (client side)
/// - `Request` → dispatched and answered (server side)
/// - `Notification` → handled without a reply
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// A response to a request we sent (has `id`, no `method`).
    Response { id: u64 },
    /// A request expecting a response (has `id` + `method`).
    Request { id: u64 },
    /// A notification (has `method`, no `id`).
    Notification,
    /// Neither a usable `id` nor a `method`.
    Invalid,
}

/// Classify a JSON-RPC message by inspecting `id` and `method` fields.
pub fn classify_message(json: &serde_json::Value) -> MessageKind {
    let id = json.get("id").and_then(|v| v.as_u64());
    let method = json.get("method").and_then(|v| v.as_str());

    match (id, method) {
        (Some(id), Some(_)) => MessageKind::Request { id },
        (Some(id), None) => MessageKind::Response { id },
        (None, Some(_)) => MessageKind::Notification,
        (None, None) => MessageKind::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_response() {
        let json = serde_json::json!({"id": 1, "result": {}});
        assert_eq!(classify_message(&json), MessageKind::Response { id: 1 });
    }

    #[test]
    fn classify_request() {
        let json = serde_json::json!({"id": 3, "method": "tools/call", "params": {}});
        assert_eq!(classify_message(&json), MessageKind::Request { id: 3 });
    }

    #[test]
    fn classify_notification() {
        let json = serde_json::json!({"method": "notifications/initialized"});
        assert_eq!(classify_message(&json), MessageKind::Notification);
    }

    #[test]
    fn classify_no_id_no_method() {
        let json = serde_json::json!({"data": "something"});
        assert_eq!(classify_message(&json), MessageKind::Invalid);
    }

    #[test]
    fn classify_error_response_with_null_id() {
        let json = serde_json::json!({"id": null, "error": {"code": -32700, "message": "x"}});
        assert_eq!(classify_message(&json), MessageKind::Invalid);
    }
}
