//! In-memory transport that answers from scripted replies.
//!
//! Replies are queued per method. A reply answers until a newer one is
//! queued behind it, so the last reply keeps answering and a reply pushed
//! between calls is served on the next call. Every request is recorded so
//! tests can inspect the params that were sent.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use serde_json::{json, Value};

use crate::error::RpcError;
use crate::transport::RpcTransport;

#[derive(Debug, Clone)]
pub enum MockReply {
    Result(Value),
    Error { code: i64, message: String },
}

#[derive(Debug, Default)]
struct ReplyQueue {
    replies: VecDeque<MockReply>,
    front_served: bool,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, ReplyQueue>>,
    requests: Mutex<Vec<Value>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`push_result`](Self::push_result).
    pub fn with_result(self, method: &str, result: Value) -> Self {
        self.push_result(method, result);
        self
    }

    pub fn push_result(&self, method: &str, result: Value) {
        self.push(method, MockReply::Result(result));
    }

    pub fn push_error(&self, method: &str, code: i64, message: &str) {
        self.push(
            method,
            MockReply::Error {
                code,
                message: message.to_string(),
            },
        );
    }

    fn push(&self, method: &str, reply: MockReply) {
        lock(&self.replies)
            .entry(method.to_string())
            .or_default()
            .replies
            .push_back(reply);
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<Value> {
        lock(&self.requests).clone()
    }

    /// Requests for `method`, in order.
    pub fn requests_for(&self, method: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|r| r["method"] == method)
            .collect()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.requests_for(method).len()
    }

    fn next_reply(&self, method: &str) -> MockReply {
        let mut replies = lock(&self.replies);
        let Some(queue) = replies.get_mut(method) else {
            return method_not_found(method);
        };
        if queue.front_served && queue.replies.len() > 1 {
            queue.replies.pop_front();
        }
        queue.front_served = true;
        queue
            .replies
            .front()
            .cloned()
            .unwrap_or_else(|| method_not_found(method))
    }

    fn answer(&self, request: Value) -> Value {
        let id = request["id"].clone();
        let method = request["method"].as_str().unwrap_or_default().to_string();
        lock(&self.requests).push(request);
        match self.next_reply(&method) {
            MockReply::Result(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
            MockReply::Error { code, message } => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": code, "message": message},
            }),
        }
    }

    fn respond(&self, body: &str) -> Result<String, RpcError> {
        let reply = match serde_json::from_str::<Value>(body)? {
            Value::Array(batch) => Value::Array(batch.into_iter().map(|r| self.answer(r)).collect()),
            single => self.answer(single),
        };
        Ok(reply.to_string())
    }
}

fn method_not_found(method: &str) -> MockReply {
    MockReply::Error {
        code: -32601,
        message: format!("Method not found: {method}"),
    }
}

impl RpcTransport for MockTransport {
    fn endpoint(&self) -> &str {
        "mock://"
    }

    async fn send(&self, body: String) -> Result<String, RpcError> {
        self.respond(&body)
    }
}
