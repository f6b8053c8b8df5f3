//! Event handlers and the capability interface they implement.

mod help;
mod vote;

pub use help::HelpHandler;
pub use vote::VoteHandler;

use crate::error::AppResult;
use crate::parser::Command;
use crate::sink::ReplySink;
use async_trait::async_trait;
use chat_client::{Event, PostedMessage};
use std::sync::Arc;

/// Event handler capability.
///
/// Handlers are registered for event-type keys (a raw type like
/// `"message"`, or `"command:<name>"` for parsed commands) and invoked by
/// the dispatcher for every matching event. A handler's error is logged at
/// the dispatch boundary and never affects other handlers.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handler identity used in logs.
    fn name(&self) -> &str;

    /// Handle one event.
    async fn handle(&self, ctx: &Context, event: &Event) -> AppResult<()>;
}

/// Per-invocation context handed to a handler: the Reply API plus the
/// parsed command when the triggering event's text was one.
#[derive(Clone)]
pub struct Context {
    sink: Arc<dyn ReplySink>,
    command: Option<Command>,
}

impl Context {
    pub fn new(sink: Arc<dyn ReplySink>, command: Option<Command>) -> Self {
        Self { sink, command }
    }

    /// The parsed command, when the event's text was trigger-prefixed.
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    /// Post a message and wait for the platform's record of it.
    ///
    /// Suspends only the issuing handler; the returned timestamp lets
    /// dependent calls (e.g. reactions) target the posted message.
    pub async fn post_message(&self, channel: &str, text: &str) -> AppResult<PostedMessage> {
        self.sink.post_message(channel, text).await
    }

    /// Attach an emoji reaction to a posted message.
    pub async fn add_reaction(&self, channel: &str, timestamp: &str, name: &str) -> AppResult<()> {
        self.sink.add_reaction(channel, timestamp, name).await
    }
}
