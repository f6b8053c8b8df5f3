//! Chat platform HTTP client.

use crate::error::ApiError;
use crate::types::*;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Authenticated REST client for the chat platform's web API.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ChatClient {
    /// Create a new client for the given API root and bearer token.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, method))
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .await?;
        Self::unwrap_envelope(method, response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::unwrap_envelope(method, response).await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            warn!("{} returned status {}", method, status);
            return Err(ApiError::Status(status.as_u16()));
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.ok {
            let reason = envelope.error.unwrap_or_else(|| "unknown error".into());
            return Err(ApiError::Api(reason));
        }
        Ok(envelope.payload)
    }

    /// Verify the bearer token and learn which identity it belongs to.
    #[instrument(skip(self))]
    pub async fn auth_test(&self) -> Result<AuthIdentity, ApiError> {
        self.get("auth.test", &[]).await
    }

    /// Post a message to a channel, returning the platform's timestamp for it.
    #[instrument(skip(self, text))]
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
    ) -> Result<PostedMessage, ApiError> {
        let posted: PostedMessage = self
            .post("chat.postMessage", &PostMessageRequest { channel, text })
            .await?;
        debug!("Posted message {} to {}", posted.ts, posted.channel);
        Ok(posted)
    }

    /// Attach an emoji reaction to a previously posted message.
    #[instrument(skip(self))]
    pub async fn add_reaction(
        &self,
        channel: &str,
        timestamp: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        let _: Acked = self
            .post(
                "reactions.add",
                &AddReactionRequest {
                    channel,
                    timestamp,
                    name,
                },
            )
            .await?;
        Ok(())
    }

    /// List the member identities of a channel.
    #[instrument(skip(self))]
    pub async fn conversation_members(&self, channel: &str) -> Result<Vec<String>, ApiError> {
        let list: MemberList = self
            .get("conversations.members", &[("channel", channel)])
            .await?;
        Ok(list.members)
    }

    /// Fetch an identity's profile.
    #[instrument(skip(self))]
    pub async fn user_info(&self, user: &str) -> Result<UserInfo, ApiError> {
        let payload: UserPayload = self.get("users.info", &[("user", user)]).await?;
        Ok(payload.user)
    }

    /// Fetch an identity's live presence.
    #[instrument(skip(self))]
    pub async fn user_presence(&self, user: &str) -> Result<Presence, ApiError> {
        let payload: PresencePayload = self.get("users.getPresence", &[("user", user)]).await?;
        Ok(payload.presence)
    }

    /// Drain the pending event queue for the authenticated bot.
    #[instrument(skip(self))]
    pub async fn fetch_events(&self) -> Result<EventPage, ApiError> {
        let page: EventPage = self.get("events.fetch", &[]).await?;
        debug!("Fetched {} events", page.events.len());
        Ok(page)
    }
}
