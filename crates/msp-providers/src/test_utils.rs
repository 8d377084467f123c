//! In-memory transport for tests.
//!
//! Available to this crate's unit tests and, through the `test-utils`
//! feature, to integration tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{ProviderError, Result};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

/// Canned vendor reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16, &'static str),
}

/// Replays replies scripted per `(method, path)` and records every request.
///
/// Replies queued with [`on`](Self::on) are consumed in order; the last one
/// of a route repeats once the queue drains. [`respond`](Self::respond) and
/// [`fail`](Self::fail) replace the route's script with a single reply.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Delay every reply; lets concurrent callers overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue `reply` behind the route's earlier replies.
    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.script
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn respond(&self, method: Method, path: &str, body: Value) {
        self.replace(method, path, Reply::Json(body));
    }

    pub fn fail(&self, method: Method, path: &str, status: u16, body: &'static str) {
        self.replace(method, path, Reply::Status(status, body));
    }

    fn replace(&self, method: Method, path: &str, reply: Reply) {
        self.script
            .lock()
            .unwrap()
            .insert((method, path.to_string()), VecDeque::from([reply]));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Most recent request sent to the route.
    pub fn request_to(&self, method: Method, path: &str) -> Option<HttpRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn total(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_reply(&self, key: &(Method, String)) -> Option<Reply> {
        let mut script = self.script.lock().unwrap();
        let queue = script.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let key = (request.method, request.path.clone());
        self.requests.lock().unwrap().push(request);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.next_reply(&key) {
            Some(Reply::Json(body)) => Ok(HttpResponse::ok(body)),
            Some(Reply::Status(status, body)) => Err(ProviderError::Status {
                status,
                body: body.to_string(),
            }),
            None => Err(ProviderError::Status {
                status: 404,
                body: format!("no route for {} {}", key.0, key.1),
            }),
        }
    }
}
