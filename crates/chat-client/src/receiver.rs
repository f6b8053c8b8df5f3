//! Event receiver with polling.

use crate::client::ChatClient;
use crate::types::Event;
use std::time::Duration;
use tokio::time::sleep;
use tokio_stream::Stream;
use tracing::{debug, error, warn};

/// Event receiver that polls the platform for pending events.
pub struct EventReceiver {
    client: ChatClient,
    poll_interval: Duration,
    verification_token: Option<String>,
}

impl EventReceiver {
    /// Create a new event receiver.
    ///
    /// When `verification_token` is set, pages carrying a different token
    /// are dropped wholesale.
    pub fn new(
        client: ChatClient,
        poll_interval: Duration,
        verification_token: Option<String>,
    ) -> Self {
        Self {
            client,
            poll_interval,
            verification_token,
        }
    }

    /// Start receiving events as an async stream.
    pub fn stream(self) -> impl Stream<Item = Event> {
        async_stream::stream! {
            loop {
                match self.client.fetch_events().await {
                    Ok(page) => {
                        if let Some(expected) = &self.verification_token {
                            if page.token.as_deref() != Some(expected.as_str()) {
                                warn!("Dropping event page with mismatched verification token");
                                sleep(self.poll_interval).await;
                                continue;
                            }
                        }
                        for event in page.events {
                            debug!(
                                "Received {} event in {}",
                                event.event_type, event.channel
                            );
                            yield event;
                        }
                    }
                    Err(e) => {
                        error!("Event fetch error: {}", e);
                        // Back off on error
                        sleep(Duration::from_secs(5)).await;
                        continue;
                    }
                }

                sleep(self.poll_interval).await;
            }
        }
    }
}
