//! Scripted speaker doubles shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kef_api::{ApiError, HttpError, PlayerSnapshot, Transport};
use kef_stream::{KefStream, SnapshotSource, StreamConfig, Subscription};
use serde_json::Value;

/// One scripted answer to a poll request
#[derive(Debug, Clone)]
pub enum PollReply {
    Body(String),
    Status(u16),
    Network,
    /// Never answer
    Hang,
}

/// Transport that plays back scripted registration and poll replies.
///
/// Once the poll script runs out every poll answers an empty batch after a
/// short delay, like an idle speaker with a tiny poll timeout.
pub struct MockTransport {
    register_reply: Result<String, u16>,
    polls: Mutex<VecDeque<PollReply>>,
    pub register_calls: AtomicUsize,
    pub poll_calls: AtomicUsize,
    pub register_query: Mutex<Vec<(String, String)>>,
    pub poll_queries: Mutex<Vec<Vec<(String, String)>>>,
}

impl MockTransport {
    pub fn new(session: &str) -> Self {
        Self::with_register_reply(Ok(format!("\"{}\"", session)))
    }

    pub fn with_register_reply(reply: Result<String, u16>) -> Self {
        Self {
            register_reply: reply,
            polls: Mutex::new(VecDeque::new()),
            register_calls: AtomicUsize::new(0),
            poll_calls: AtomicUsize::new(0),
            register_query: Mutex::new(Vec::new()),
            poll_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn then(self, reply: PollReply) -> Self {
        self.polls.lock().unwrap().push_back(reply);
        self
    }

    pub fn then_body(self, records: Value) -> Self {
        self.then(PollReply::Body(records.to_string()))
    }

    pub fn then_repeat(self, reply: PollReply, times: usize) -> Self {
        (0..times).fold(self, |transport, _| transport.then(reply.clone()))
    }

    pub fn polls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn register_param(&self, key: &str) -> Option<String> {
        self.register_query
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

fn owned(query: &[(&str, &str)]) -> Vec<(String, String)> {
    query
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String, HttpError> {
        match path {
            "/api/event/modifyQueue" => {
                self.register_calls.fetch_add(1, Ordering::SeqCst);
                *self.register_query.lock().unwrap() = owned(query);
                self.register_reply.clone().map_err(HttpError::Status)
            }
            "/api/event/pollQueue" => {
                self.poll_calls.fetch_add(1, Ordering::SeqCst);
                self.poll_queries.lock().unwrap().push(owned(query));
                let reply = self.polls.lock().unwrap().pop_front();

                match reply {
                    Some(PollReply::Body(body)) => Ok(body),
                    Some(PollReply::Status(status)) => Err(HttpError::Status(status)),
                    Some(PollReply::Network) => Err(HttpError::Network("connection refused".to_string())),
                    Some(PollReply::Hang) => std::future::pending().await,
                    None => {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Ok("[]".to_string())
                    }
                }
            }
            _ => Err(HttpError::Status(404)),
        }
    }
}

/// Snapshot source returning a fixed player document, or failing
pub struct MockSnapshot {
    snapshot: Option<Value>,
    pub calls: AtomicUsize,
}

impl MockSnapshot {
    pub fn returning(value: Value) -> Self {
        Self {
            snapshot: Some(value),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            snapshot: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SnapshotSource for MockSnapshot {
    async fn fetch_player_snapshot(&self) -> Result<PlayerSnapshot, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.snapshot {
            Some(value) => Ok(PlayerSnapshot::from_value(value)?),
            None => Err(ApiError::Transport(HttpError::Timeout)),
        }
    }
}

/// Short pauses so failure paths finish quickly
pub fn test_config() -> StreamConfig {
    StreamConfig::fast().with_retry_pause(Duration::from_millis(1))
}

pub fn value_record(path: &str, value: Value) -> Value {
    serde_json::json!({"path": path, "itemType": "itemWithValue", "itemValue": value})
}

pub async fn connect(transport: Arc<MockTransport>, snapshots: Arc<MockSnapshot>) -> KefStream {
    connect_with(transport, snapshots, test_config()).await
}

pub async fn connect_with(
    transport: Arc<MockTransport>,
    snapshots: Arc<MockSnapshot>,
    config: StreamConfig,
) -> KefStream {
    KefStream::connect(transport, snapshots, Subscription::defaults(), config)
        .await
        .expect("connect")
}
