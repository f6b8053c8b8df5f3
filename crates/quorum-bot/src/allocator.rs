//! Development-mode credential allocation.

use chat_client::ChatClient;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Static pool of test-bot credentials plus the channel whose member list
/// enumerates the candidate identities.
#[derive(Debug, Clone)]
pub struct CredentialPool {
    /// Channel containing every pool identity; used purely for discovery.
    pub meeting_room: String,
    /// identity id -> bot token.
    pub tokens: HashMap<String, String>,
}

/// A credential picked for this process.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub identity_id: String,
    pub token: String,
    pub display_name: String,
}

/// Picks a free test-bot credential by scanning the meeting room.
///
/// Advisory only: presence is checked, never reserved, so two processes
/// allocating at the same instant can still collide. Liveness is re-fetched
/// on every attempt and never cached.
pub struct TokenAllocator {
    client: ChatClient,
    pool: CredentialPool,
    attempt_timeout: Duration,
}

impl TokenAllocator {
    pub fn new(client: ChatClient, pool: CredentialPool, attempt_timeout: Duration) -> Self {
        Self {
            client,
            pool,
            attempt_timeout,
        }
    }

    /// Allocate the first active, away identity from the meeting room.
    ///
    /// Fail-fast: any failing external query aborts the whole attempt as
    /// `None`; nothing is retried within an attempt. The attempt as a whole
    /// is bounded by the configured timeout.
    pub async fn allocate(&self) -> Option<Allocation> {
        match timeout(self.attempt_timeout, self.scan()).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Allocation attempt timed out after {:?}",
                    self.attempt_timeout
                );
                None
            }
        }
    }

    async fn scan(&self) -> Option<Allocation> {
        let members = match self.client.conversation_members(&self.pool.meeting_room).await {
            Ok(members) => members,
            Err(e) => {
                error!("Failed to list meeting room members: {}", e);
                return None;
            }
        };

        for user_id in members {
            let info = match self.client.user_info(&user_id).await {
                Ok(info) => info,
                Err(e) => {
                    error!("Failed to fetch profile for {}: {}", user_id, e);
                    return None;
                }
            };
            if !info.is_active_bot() {
                continue;
            }

            let presence = match self.client.user_presence(&user_id).await {
                Ok(presence) => presence,
                Err(e) => {
                    error!("Failed to fetch presence for {}: {}", user_id, e);
                    return None;
                }
            };
            if !presence.is_away() {
                continue;
            }

            match self.pool.tokens.get(&user_id) {
                Some(token) => {
                    info!("Allocated free test bot {}", info.name);
                    return Some(Allocation {
                        identity_id: user_id,
                        token: token.clone(),
                        display_name: info.name,
                    });
                }
                None => {
                    warn!("{} is free but has no pool credential, skipping", info.name);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pool() -> CredentialPool {
        CredentialPool {
            meeting_room: "G9XY".into(),
            tokens: HashMap::from([
                ("UA".into(), "xoxb-alpha".into()),
                ("UB".into(), "xoxb-beta".into()),
                ("UC".into(), "xoxb-gamma".into()),
            ]),
        }
    }

    fn allocator(mock_server: &MockServer) -> TokenAllocator {
        let client = ChatClient::new(mock_server.uri(), "xoxp-broker").unwrap();
        TokenAllocator::new(client, pool(), Duration::from_secs(5))
    }

    async fn mount_members(mock_server: &MockServer, members: &[&str]) {
        Mock::given(method("GET"))
            .and(path("/conversations.members"))
            .and(query_param("channel", "G9XY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "members": members
            })))
            .mount(mock_server)
            .await;
    }

    async fn mount_user(mock_server: &MockServer, id: &str, name: &str, is_bot: bool, deleted: bool) {
        Mock::given(method("GET"))
            .and(path("/users.info"))
            .and(query_param("user", id))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "user": { "id": id, "name": name, "is_bot": is_bot, "deleted": deleted }
            })))
            .mount(mock_server)
            .await;
    }

    async fn mount_presence(mock_server: &MockServer, id: &str, presence: &str) {
        Mock::given(method("GET"))
            .and(path("/users.getPresence"))
            .and(query_param("user", id))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "presence": presence
            })))
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn first_active_away_candidate_wins() {
        let mock_server = MockServer::start().await;
        mount_members(&mock_server, &["UA", "UB", "UC"]).await;
        // UA is a deleted bot, UB is in use, UC is free.
        mount_user(&mock_server, "UA", "quorumbot-alpha", true, true).await;
        mount_user(&mock_server, "UB", "quorumbot-beta", true, false).await;
        mount_presence(&mock_server, "UB", "active").await;
        mount_user(&mock_server, "UC", "quorumbot-gamma", true, false).await;
        mount_presence(&mock_server, "UC", "away").await;

        let allocation = allocator(&mock_server).allocate().await.unwrap();
        assert_eq!(allocation.identity_id, "UC");
        assert_eq!(allocation.token, "xoxb-gamma");
        assert_eq!(allocation.display_name, "quorumbot-gamma");
    }

    #[tokio::test]
    async fn all_candidates_in_use_means_none_available() {
        let mock_server = MockServer::start().await;
        mount_members(&mock_server, &["UA", "UB", "UC"]).await;
        for (id, name) in [("UA", "a"), ("UB", "b"), ("UC", "c")] {
            mount_user(&mock_server, id, name, true, false).await;
            mount_presence(&mock_server, id, "active").await;
        }

        assert!(allocator(&mock_server).allocate().await.is_none());
    }

    #[tokio::test]
    async fn listing_failure_aborts_without_candidate_queries() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conversations.members"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users.info"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        assert!(allocator(&mock_server).allocate().await.is_none());
    }

    #[tokio::test]
    async fn candidate_query_failure_aborts_the_attempt() {
        let mock_server = MockServer::start().await;
        mount_members(&mock_server, &["UA", "UC"]).await;
        // UA's profile query blows up; UC would have been free, but the
        // attempt is fail-fast.
        Mock::given(method("GET"))
            .and(path("/users.info"))
            .and(query_param("user", "UA"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        mount_user(&mock_server, "UC", "quorumbot-gamma", true, false).await;
        mount_presence(&mock_server, "UC", "away").await;

        assert!(allocator(&mock_server).allocate().await.is_none());
    }

    #[tokio::test]
    async fn free_candidate_without_credential_is_skipped() {
        let mock_server = MockServer::start().await;
        mount_members(&mock_server, &["UX", "UC"]).await;
        mount_user(&mock_server, "UX", "stranger", true, false).await;
        mount_presence(&mock_server, "UX", "away").await;
        mount_user(&mock_server, "UC", "quorumbot-gamma", true, false).await;
        mount_presence(&mock_server, "UC", "away").await;

        let allocation = allocator(&mock_server).allocate().await.unwrap();
        assert_eq!(allocation.identity_id, "UC");
    }

    #[tokio::test]
    async fn non_bot_members_are_skipped() {
        let mock_server = MockServer::start().await;
        mount_members(&mock_server, &["UH", "UC"]).await;
        // A human in the meeting room is never a candidate.
        mount_user(&mock_server, "UH", "mitch", false, false).await;
        mount_user(&mock_server, "UC", "quorumbot-gamma", true, false).await;
        mount_presence(&mock_server, "UC", "away").await;

        let allocation = allocator(&mock_server).allocate().await.unwrap();
        assert_eq!(allocation.identity_id, "UC");
    }
}
