//! Vote command - posts a question and seeds the tally reactions.

use crate::error::AppResult;
use crate::handlers::{Context, EventHandler};
use async_trait::async_trait;
use chat_client::Event;
use tracing::info;

/// Reactions seeded on every vote, in this order.
const VOTE_REACTIONS: [&str; 3] = ["thumbsup", "thumbsdown", "eyes"];

pub struct VoteHandler;

impl VoteHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VoteHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler for VoteHandler {
    fn name(&self) -> &str {
        "vote"
    }

    async fn handle(&self, ctx: &Context, _event: &Event) -> AppResult<()> {
        let Some(cmd) = ctx.command() else {
            return Ok(());
        };

        if !cmd.has_arg() {
            ctx.post_message(
                &cmd.channel,
                "Invalid vote command. Usage: !vote <question>",
            )
            .await?;
            return Ok(());
        }

        let posted = ctx
            .post_message(&cmd.channel, &format!("Starting vote: {}", cmd.arg))
            .await?;
        for name in VOTE_REACTIONS {
            ctx.add_reaction(&posted.channel, &posted.ts, name).await?;
        }

        info!("Started vote in {}: {}", cmd.channel, cmd.arg);
        Ok(())
    }
}
