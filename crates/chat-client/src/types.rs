//! Chat platform API types.

use serde::{Deserialize, Serialize};

/// Every API response wraps its payload in an `ok`/`error` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

/// Empty payload for calls that only acknowledge.
#[derive(Debug, Deserialize)]
pub(crate) struct Acked {}

/// One inbound event from the platform.
///
/// Immutable once received; the dispatcher shares it with handlers by
/// reference, so handlers clone any field they want to rework.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub ts: String,
}

impl Event {
    /// Build a plain channel message event, used by the local input loop.
    pub fn message(
        channel: impl Into<String>,
        user: impl Into<String>,
        text: impl Into<String>,
        ts: impl Into<String>,
    ) -> Self {
        Self {
            event_type: "message".into(),
            text: Some(text.into()),
            channel: channel.into(),
            user: user.into(),
            ts: ts.into(),
        }
    }
}

/// One page of pending events returned by `events.fetch`.
///
/// `token` echoes the platform's verification token so consumers can
/// reject pages that did not originate from their own workspace.
#[derive(Debug, Deserialize)]
pub struct EventPage {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Identity confirmed by `auth.test`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthIdentity {
    pub user_id: String,
    pub user: String,
}

/// Outgoing `chat.postMessage` request body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PostMessageRequest<'a> {
    pub channel: &'a str,
    pub text: &'a str,
}

/// The platform's record of a posted message.
#[derive(Debug, Clone, Deserialize)]
pub struct PostedMessage {
    pub channel: String,
    /// Platform timestamp, the message's unique id within its channel.
    pub ts: String,
}

/// Outgoing `reactions.add` request body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddReactionRequest<'a> {
    pub channel: &'a str,
    pub timestamp: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MemberList {
    pub members: Vec<String>,
}

/// Profile facts the allocator cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub deleted: bool,
}

impl UserInfo {
    /// An active automation identity: a bot account that has not been deleted.
    pub fn is_active_bot(&self) -> bool {
        self.is_bot && !self.deleted
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserPayload {
    pub user: UserInfo,
}

/// Live presence of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Active,
    Away,
}

impl Presence {
    /// "Away" means nobody is driving this identity right now.
    pub fn is_away(&self) -> bool {
        matches!(self, Presence::Away)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PresencePayload {
    pub presence: Presence,
}
