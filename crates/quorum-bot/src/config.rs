//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Platform API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Bot runtime configuration
    #[serde(default)]
    pub bot: BotConfig,

    /// Development credential pool configuration
    #[serde(default)]
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Platform web API root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bot authentication token (unused in local and dev modes)
    #[serde(default)]
    pub token: String,

    /// Verification token for inbound event pages; empty disables the check
    #[serde(default)]
    pub verification_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Run in local (CLI) mode: stdin events, console replies
    #[serde(default)]
    pub local: bool,

    /// Run in development mode: auto-allocate a test-bot credential
    #[serde(default)]
    pub dev: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Trigger prefix marking text as a command
    #[serde(default = "default_trigger")]
    pub trigger: String,

    /// Poll interval for the networked event source
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Grace period for in-flight handlers at shutdown
    #[serde(default = "default_drain_timeout", with = "humantime_serde")]
    pub drain_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Channel whose members are the candidate test-bot identities
    #[serde(default)]
    pub meeting_room: String,

    /// Token used for the allocator's discovery queries
    #[serde(default)]
    pub broker_token: String,

    /// identity id -> bot token
    #[serde(default)]
    pub tokens: HashMap<String, String>,

    /// Upper bound on one whole allocation attempt
    #[serde(default = "default_allocation_timeout", with = "humantime_serde")]
    pub allocation_timeout: Duration,
}

// Default implementations
impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            verification_token: String::new(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            local: false,
            dev: false,
            log_level: default_log_level(),
            trigger: default_trigger(),
            poll_interval: default_poll_interval(),
            drain_timeout: default_drain_timeout(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            meeting_room: String::new(),
            broker_token: String::new(),
            tokens: HashMap::new(),
            allocation_timeout: default_allocation_timeout(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://slack.com/api".into()
}

fn default_log_level() -> String {
    "info".into()
}

fn default_trigger() -> String {
    "!".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_drain_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_allocation_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    // Tokens must stay strings even when they look numeric.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
