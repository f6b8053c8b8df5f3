//! Event dispatcher: routes inbound events to registered handlers.

use crate::error::AppResult;
use crate::handlers::Context;
use crate::parser::Command;
use crate::registry::HandlerRegistry;
use crate::sink::ReplySink;
use crate::source::EventSource;
use chat_client::Event;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Dispatcher lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connecting,
    Running,
    Draining,
    Stopped,
    /// Terminal: initial authentication was rejected.
    Failed,
}

/// Owns the event loop: receives events from an [`EventSource`], looks up
/// matching handlers, and runs them with per-handler failure isolation.
///
/// Handlers for one event run sequentially in registration order; events
/// run concurrently with each other and with continued intake. The only
/// suspension points are the event receive and each handler's own awaited
/// reply calls.
pub struct Dispatcher {
    registry: HandlerRegistry,
    sink: Arc<dyn ReplySink>,
    trigger: String,
    drain_timeout: Duration,
    state: RunState,
}

impl Dispatcher {
    /// Build a dispatcher, taking ownership of the registry. No further
    /// registration is possible once the dispatcher exists.
    pub fn new(
        registry: HandlerRegistry,
        sink: Arc<dyn ReplySink>,
        trigger: impl Into<String>,
        drain_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            sink,
            trigger: trigger.into(),
            drain_timeout,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Connect the source and run the event loop until the source ends or
    /// `shutdown` resolves. Returns the fatal error when connecting fails.
    pub async fn run<S, F>(&mut self, source: &mut S, shutdown: F) -> AppResult<()>
    where
        S: EventSource + ?Sized,
        F: Future<Output = ()>,
    {
        self.state = RunState::Connecting;
        if let Err(e) = source.connect().await {
            self.state = RunState::Failed;
            error!("Connection failed: {}", e);
            return Err(e);
        }

        self.state = RunState::Running;
        info!(
            "Dispatcher running ({} handler registrations)",
            self.registry.len()
        );

        let mut tasks: JoinSet<()> = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                received = source.next_event() => match received {
                    Ok(Some(event)) => self.dispatch(&mut tasks, event),
                    Ok(None) => {
                        info!("Event source ended");
                        break;
                    }
                    Err(e) => {
                        // Reconnect policy is the transport's problem.
                        error!("Event source error: {}", e);
                    }
                },
                Some(finished) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = finished {
                        if e.is_panic() {
                            error!("Event task panicked: {}", e);
                        }
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.state = RunState::Draining;
        self.drain(tasks).await;
        self.state = RunState::Stopped;
        Ok(())
    }

    /// Route one event: handlers for its raw event type, then handlers for
    /// its `command:<name>` key when the text parsed as a command. The
    /// matched handlers run on their own task so intake continues.
    fn dispatch(&self, tasks: &mut JoinSet<()>, event: Event) {
        let command = Command::parse(&event, &self.trigger);

        let mut matched = self.registry.handlers_for(&event.event_type);
        if let Some(cmd) = &command {
            matched.extend(self.registry.handlers_for(&format!("command:{}", cmd.name)));
        }
        if matched.is_empty() {
            debug!("No handlers for {} event", event.event_type);
            return;
        }

        let sink = Arc::clone(&self.sink);
        let event = Arc::new(event);
        tasks.spawn(async move {
            for handler in matched {
                let name = handler.name().to_string();
                let ctx = Context::new(Arc::clone(&sink), command.clone());
                let ev = Arc::clone(&event);

                // Each handler call gets its own task so a panic in one
                // cannot take down the rest of the chain.
                let outcome = tokio::spawn(async move { handler.handle(&ctx, &ev).await }).await;
                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!(
                        handler = %name,
                        event_type = %event.event_type,
                        channel = %event.channel,
                        ts = %event.ts,
                        "Handler failed: {}", e
                    ),
                    Err(join_err) => error!(
                        handler = %name,
                        event_type = %event.event_type,
                        "Handler panicked: {}", join_err
                    ),
                }
            }
        });
    }

    /// Give in-flight event tasks a bounded grace period, then abandon
    /// them. Their outbound calls may still complete server-side.
    async fn drain(&mut self, mut tasks: JoinSet<()>) {
        if tasks.is_empty() {
            return;
        }
        info!("Draining {} in-flight event tasks", tasks.len());

        let deadline = tokio::time::sleep(self.drain_timeout);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                finished = tasks.join_next() => match finished {
                    None => break,
                    Some(Err(e)) if e.is_panic() => {
                        error!("Event task panicked during drain: {}", e);
                    }
                    Some(_) => {}
                },
                _ = &mut deadline => {
                    warn!("Drain timeout reached, abandoning {} tasks", tasks.len());
                    tasks.abort_all();
                    break;
                }
            }
        }
    }
}
