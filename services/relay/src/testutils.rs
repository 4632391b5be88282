//! Scripted in-memory Resource API for tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use common::{ResourceApi, UpstreamResult};
use serde_json::Value;

type Responder = dyn Fn(&RecordedCall) -> UpstreamResult<Value> + Send + Sync;

/// A request seen by [`FakeResourceApi`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Answers every call through a closure and records what it was asked
pub struct FakeResourceApi {
    responder: Box<Responder>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeResourceApi {
    pub fn new(
        responder: impl Fn(&RecordedCall) -> UpstreamResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Delay every response for `path` by `delay`
    pub fn with_delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self, call: RecordedCall) -> UpstreamResult<Value> {
        self.calls.lock().unwrap().push(call.clone());

        if let Some(delay) = self.delays.get(&call.path) {
            tokio::time::sleep(*delay).await;
        }

        (self.responder)(&call)
    }
}

#[async_trait]
impl ResourceApi for FakeResourceApi {
    async fn get(&self, path: &str, query: &[(String, String)]) -> UpstreamResult<Value> {
        self.respond(RecordedCall {
            method: "GET",
            path: path.to_string(),
            query: query.to_vec(),
            body: None,
        })
        .await
    }

    async fn post(&self, path: &str, body: &Value) -> UpstreamResult<Value> {
        self.respond(RecordedCall {
            method: "POST",
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
        })
        .await
    }
}

/// Value of the first `key` pair in a query
pub fn query_value<'q>(query: &'q [(String, String)], key: &str) -> Option<&'q str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
