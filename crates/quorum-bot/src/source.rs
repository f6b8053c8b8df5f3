//! Event sources: where the dispatcher's inbound events come from.

use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chat_client::{ChatClient, Event, EventReceiver};
use std::pin::Pin;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_stream::{Stream, StreamExt};
use tracing::info;

/// Sequence of inbound events consumed by the dispatcher.
#[async_trait]
pub trait EventSource: Send {
    /// Authenticate/prepare the source. Called once before the first
    /// `next_event`; an error here is fatal and never retried.
    async fn connect(&mut self) -> AppResult<()>;

    /// Receive the next event, suspending until one arrives.
    /// `Ok(None)` means the source has ended.
    async fn next_event(&mut self) -> AppResult<Option<Event>>;
}

/// Networked event source: authenticates, then polls the platform's
/// pending-event queue.
pub struct PollSource {
    client: ChatClient,
    poll_interval: Duration,
    verification_token: Option<String>,
    stream: Option<Pin<Box<dyn Stream<Item = Event> + Send>>>,
}

impl PollSource {
    pub fn new(
        client: ChatClient,
        poll_interval: Duration,
        verification_token: Option<String>,
    ) -> Self {
        Self {
            client,
            poll_interval,
            verification_token,
            stream: None,
        }
    }
}

#[async_trait]
impl EventSource for PollSource {
    async fn connect(&mut self) -> AppResult<()> {
        let identity = self
            .client
            .auth_test()
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;
        info!("Authenticated as {} ({})", identity.user, identity.user_id);

        let receiver = EventReceiver::new(
            self.client.clone(),
            self.poll_interval,
            self.verification_token.clone(),
        );
        self.stream = Some(Box::pin(receiver.stream()));
        Ok(())
    }

    async fn next_event(&mut self) -> AppResult<Option<Event>> {
        match self.stream.as_mut() {
            Some(stream) => Ok(stream.next().await),
            None => Err(AppError::Auth("event source is not connected".into())),
        }
    }
}

/// Local/CLI event source: each stdin line becomes a `"message"` event in
/// the `"local"` channel. EOF ends the stream.
pub struct StdinSource {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinSource {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    fn now_ts() -> String {
        let now = chrono::Utc::now();
        format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSource for StdinSource {
    async fn connect(&mut self) -> AppResult<()> {
        info!("Local mode: reading messages from stdin");
        Ok(())
    }

    async fn next_event(&mut self) -> AppResult<Option<Event>> {
        match self.lines.next_line().await? {
            Some(line) => Ok(Some(Event::message("local", "local", line, Self::now_ts()))),
            None => Ok(None),
        }
    }
}
