//! Help command - displays available commands.

use crate::error::AppResult;
use crate::handlers::{Context, EventHandler};
use async_trait::async_trait;
use chat_client::Event;

pub struct HelpHandler;

impl HelpHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HelpHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler for HelpHandler {
    fn name(&self) -> &str {
        "help"
    }

    async fn handle(&self, ctx: &Context, _event: &Event) -> AppResult<()> {
        let Some(cmd) = ctx.command() else {
            return Ok(());
        };

        ctx.post_message(
            &cmd.channel,
            "Commands:\n\
             - !vote <question> - start a thumbs vote on a question\n\
             - !help - show this message",
        )
        .await?;
        Ok(())
    }
}
