#![allow(dead_code)]

use async_trait::async_trait;
use codesearch::{Config, Error, Result, SearchBackend, SearchRequest, SnippetResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// What the mock answers to one search
pub enum Reply {
    Results(Vec<SnippetResult>),
    NetworkError,
    Status(u16),
}

pub type CallLog = Arc<Mutex<Vec<(String, SearchRequest)>>>;

struct Scripted {
    query: Option<String>,
    gate: Option<oneshot::Receiver<()>>,
    reply: Reply,
}

/// In-memory backend that records every request and answers from a script.
/// Replies are used in the order they were queued, skipping ones tied to a
/// different query. Unscripted calls get an empty result list.
#[derive(Default)]
pub struct MockBackend {
    calls: CallLog,
    replies: Mutex<VecDeque<Scripted>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> CallLog {
        Arc::clone(&self.calls)
    }

    /// Queue a reply that is returned immediately
    pub fn reply(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(Scripted {
            query: None,
            gate: None,
            reply,
        });
        self
    }

    /// Queue a reply that is held back until the returned sender fires
    pub fn gated_reply(&self, reply: Reply) -> oneshot::Sender<()> {
        self.push_gated(None, reply)
    }

    /// Like [`gated_reply`](Self::gated_reply) but only used for `query`
    pub fn gated_reply_for(&self, query: &str, reply: Reply) -> oneshot::Sender<()> {
        self.push_gated(Some(query.to_string()), reply)
    }

    fn push_gated(&self, query: Option<String>, reply: Reply) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Scripted {
            query,
            gate: Some(rx),
            reply,
        });
        tx
    }

    fn take_reply(&self, query: &str) -> Option<Scripted> {
        let mut replies = self.replies.lock().unwrap();
        let index = replies
            .iter()
            .position(|s| s.query.as_deref().map_or(true, |q| q == query))?;
        replies.remove(index)
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn search(
        &self,
        collection: &str,
        request: &SearchRequest,
    ) -> Result<Vec<SnippetResult>> {
        self.calls
            .lock()
            .unwrap()
            .push((collection.to_string(), request.clone()));

        let Scripted { gate, reply, .. } = self.take_reply(&request.query).unwrap_or(Scripted {
            query: None,
            gate: None,
            reply: Reply::Results(Vec::new()),
        });

        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match reply {
            Reply::Results(results) => Ok(results),
            Reply::NetworkError => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            Reply::Status(status) => Err(Error::Status {
                status,
                detail: "Internal Server Error".to_string(),
            }),
        }
    }
}

pub fn test_config() -> Config {
    Config::new("http://127.0.0.1:8001", "demo").unwrap()
}

pub fn snippet(id: &str, file_path: &str, line_start: u32) -> SnippetResult {
    SnippetResult::new(id, file_path, format!("// snippet {}\nlet x = 1;\n", id), line_start)
}

pub fn call_count(calls: &CallLog) -> usize {
    calls.lock().unwrap().len()
}

/// Let spawned tasks run until `done` holds or a second has passed
pub async fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    done()
}
