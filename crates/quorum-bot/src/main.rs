//! Quorum bot - main entry point.

use anyhow::Context as _;
use chat_client::ChatClient;
use quorum_bot::allocator::{CredentialPool, TokenAllocator};
use quorum_bot::config::Config;
use quorum_bot::dispatcher::Dispatcher;
use quorum_bot::error::{AppError, AppResult};
use quorum_bot::handlers::{HelpHandler, VoteHandler};
use quorum_bot::registry::HandlerRegistry;
use quorum_bot::sink::{ApiSink, ConsoleSink, ReplySink};
use quorum_bot::source::{PollSource, StdinSource};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level);

    info!("Starting quorum-bot...");

    // Register handlers; the registry is sealed once the dispatcher owns it.
    let mut registry = HandlerRegistry::new();
    registry.register("command:vote", Arc::new(VoteHandler::new()));
    registry.register("command:help", Arc::new(HelpHandler::new()));
    info!("Registered {} handlers", registry.len());

    if config.bot.local {
        let sink: Arc<dyn ReplySink> = Arc::new(ConsoleSink::new());
        let mut dispatcher = Dispatcher::new(
            registry,
            sink,
            &config.bot.trigger,
            config.bot.drain_timeout,
        );
        let mut source = StdinSource::new();
        return dispatcher.run(&mut source, shutdown_signal()).await;
    }

    // In development mode, attempt to allocate an available test-bot
    // credential; otherwise stick with the configured token.
    let token = if config.bot.dev {
        let broker = ChatClient::new(&config.api.base_url, &config.pool.broker_token)?;
        let allocator = TokenAllocator::new(
            broker,
            CredentialPool {
                meeting_room: config.pool.meeting_room.clone(),
                tokens: config.pool.tokens.clone(),
            },
            config.pool.allocation_timeout,
        );
        match allocator.allocate().await {
            Some(allocation) => {
                info!("Bot name: {}", allocation.display_name);
                allocation.token
            }
            None => {
                error!(
                    "Something went wrong during bot allocation. Please ensure \
                     there are bots available and try again later. Exiting."
                );
                return Err(AppError::NoBotAvailable);
            }
        }
    } else {
        config.api.token.clone()
    };

    let client = ChatClient::new(&config.api.base_url, token)?;
    let sink: Arc<dyn ReplySink> = Arc::new(ApiSink::new(client.clone()));
    let verification_token =
        (!config.api.verification_token.is_empty()).then(|| config.api.verification_token.clone());
    let mut source = PollSource::new(client, config.bot.poll_interval, verification_token);

    let mut dispatcher = Dispatcher::new(
        registry,
        sink,
        &config.bot.trigger,
        config.bot.drain_timeout,
    );
    dispatcher.run(&mut source, shutdown_signal()).await?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
