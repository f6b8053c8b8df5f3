//! Reply sink: where handlers' outbound calls go.

use crate::error::AppResult;
use async_trait::async_trait;
use chat_client::{ChatClient, PostedMessage};
use tracing::debug;

/// Destination for outbound replies.
///
/// The dispatcher hands handlers this seam instead of a concrete client so
/// local/CLI mode can swap in a console implementation.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Post a message, returning the platform's record of it.
    async fn post_message(&self, channel: &str, text: &str) -> AppResult<PostedMessage>;

    /// Attach an emoji reaction to a posted message.
    async fn add_reaction(&self, channel: &str, timestamp: &str, name: &str) -> AppResult<()>;
}

/// Reply sink backed by the platform's REST API.
pub struct ApiSink {
    client: ChatClient,
}

impl ApiSink {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReplySink for ApiSink {
    async fn post_message(&self, channel: &str, text: &str) -> AppResult<PostedMessage> {
        Ok(self.client.post_message(channel, text).await?)
    }

    async fn add_reaction(&self, channel: &str, timestamp: &str, name: &str) -> AppResult<()> {
        self.client.add_reaction(channel, timestamp, name).await?;
        Ok(())
    }
}

/// Reply sink for local/CLI mode: prints outbound calls instead of sending
/// them, synthesizing timestamps so dependent calls still line up.
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn now_ts() -> String {
        let now = chrono::Utc::now();
        format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplySink for ConsoleSink {
    async fn post_message(&self, channel: &str, text: &str) -> AppResult<PostedMessage> {
        let ts = Self::now_ts();
        println!("[{channel}] {text}");
        debug!("Printed message {} to {}", ts, channel);
        Ok(PostedMessage {
            channel: channel.to_string(),
            ts,
        })
    }

    async fn add_reaction(&self, channel: &str, timestamp: &str, name: &str) -> AppResult<()> {
        println!("[{channel}] reacted :{name}: to {timestamp}");
        Ok(())
    }
}
