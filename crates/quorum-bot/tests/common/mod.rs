//! Common test doubles for dispatcher tests.

use async_trait::async_trait;
use chat_client::{Event, PostedMessage};
use quorum_bot::error::{AppError, AppResult};
use quorum_bot::handlers::{Context, EventHandler};
use quorum_bot::sink::ReplySink;
use quorum_bot::source::EventSource;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Event source that replays a fixed script, then ends.
pub struct ScriptedSource {
    events: VecDeque<Event>,
    reject_connect: bool,
}

impl ScriptedSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into(),
            reject_connect: false,
        }
    }

    /// A source whose connect is rejected, as with bad credentials.
    pub fn rejecting() -> Self {
        Self {
            events: VecDeque::new(),
            reject_connect: true,
        }
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn connect(&mut self) -> AppResult<()> {
        if self.reject_connect {
            return Err(AppError::Auth("invalid_auth".into()));
        }
        Ok(())
    }

    async fn next_event(&mut self) -> AppResult<Option<Event>> {
        Ok(self.events.pop_front())
    }
}

/// One outbound call observed by the recording sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Post {
        channel: String,
        text: String,
        ts: String,
    },
    Reaction {
        channel: String,
        ts: String,
        name: String,
    },
}

/// Reply sink that records every call and hands out sequential timestamps.
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    counter: AtomicU64,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn post_message(&self, channel: &str, text: &str) -> AppResult<PostedMessage> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let ts = format!("1503435956.{:06}", n);
        self.calls.lock().unwrap().push(SinkCall::Post {
            channel: channel.to_string(),
            text: text.to_string(),
            ts: ts.clone(),
        });
        Ok(PostedMessage {
            channel: channel.to_string(),
            ts,
        })
    }

    async fn add_reaction(&self, channel: &str, timestamp: &str, name: &str) -> AppResult<()> {
        self.calls.lock().unwrap().push(SinkCall::Reaction {
            channel: channel.to_string(),
            ts: timestamp.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }
}

/// Handler that appends its label to a shared log.
pub struct Recorder {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new(label: &'static str, log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self { label, log })
    }
}

#[async_trait]
impl EventHandler for Recorder {
    fn name(&self) -> &str {
        self.label
    }

    async fn handle(&self, _ctx: &Context, event: &Event) -> AppResult<()> {
        let text = event.text.clone().unwrap_or_default();
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.label, text));
        Ok(())
    }
}

/// Handler that records its label, then fails.
pub struct Failing {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Failing {
    pub fn new(label: &'static str, log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self { label, log })
    }
}

#[async_trait]
impl EventHandler for Failing {
    fn name(&self) -> &str {
        self.label
    }

    async fn handle(&self, _ctx: &Context, event: &Event) -> AppResult<()> {
        let text = event.text.clone().unwrap_or_default();
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.label, text));
        Err(AppError::Config(anyhow::anyhow!("handler blew up")))
    }
}

/// Handler that panics outright.
pub struct Panicking;

#[async_trait]
impl EventHandler for Panicking {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn handle(&self, _ctx: &Context, _event: &Event) -> AppResult<()> {
        panic!("handler panicked");
    }
}
