//! Relay configuration
//!
//! Values come from built-in defaults overlaid with `RELAY__*` environment
//! variables, `__` separating nested keys (e.g. `RELAY__VIDEO__ACCESS_KEY`).

use anyhow::{Context, Result};
use ::config::{Config, Environment};
use serde::Deserialize;

use crate::pagination::DEFAULT_PAGE_LIMIT;

/// Top-level relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Address the HTTP server binds to
    pub bind_address: String,
    pub video: VideoConfig,
    pub telephony: TelephonyConfig,
}

/// Video-room provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfig {
    /// Access key embedded in every issued token
    pub access_key: String,
    /// Secret used to sign tokens
    pub app_secret: String,
    /// Resource API base URL
    pub api_base_url: String,
    /// Management token lifetime in seconds (default: 1 day)
    pub management_token_expiry: u64,
    /// Auth token lifetime in seconds (default: 1 day)
    pub auth_token_expiry: u64,
    /// Page size requested while walking paginated lists
    pub page_limit: usize,
    /// Maximum number of page requests for a single list walk
    pub max_pages: usize,
    /// Role whose room codes are attached to listed rooms
    pub guest_role: String,
}

/// Telephony provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct TelephonyConfig {
    /// Account identifier, also the basic-auth user
    pub account_sid: String,
    /// Basic-auth password
    pub auth_token: String,
    /// Caller number used when a request does not name one
    pub from_number: String,
    /// Telephony REST base URL
    pub api_base_url: String,
    /// Call-instructions URL used when a request does not name one
    pub voice_url: Option<String>,
}

impl RelayConfig {
    /// Load the configuration from the process environment
    ///
    /// # Environment Variables
    /// - `RELAY__BIND_ADDRESS` (default: "0.0.0.0:3000")
    /// - `RELAY__VIDEO__ACCESS_KEY`, `RELAY__VIDEO__APP_SECRET` (required)
    /// - `RELAY__VIDEO__API_BASE_URL` (default: "https://api.100ms.live/v2")
    /// - `RELAY__VIDEO__MANAGEMENT_TOKEN_EXPIRY`, `RELAY__VIDEO__AUTH_TOKEN_EXPIRY` (default: 86400)
    /// - `RELAY__VIDEO__PAGE_LIMIT` (default: 20), `RELAY__VIDEO__MAX_PAGES` (default: 500)
    /// - `RELAY__VIDEO__GUEST_ROLE` (default: "guest")
    /// - `RELAY__TELEPHONY__ACCOUNT_SID`, `RELAY__TELEPHONY__AUTH_TOKEN`,
    ///   `RELAY__TELEPHONY__FROM_NUMBER` (required)
    /// - `RELAY__TELEPHONY__API_BASE_URL` (default: "https://api.twilio.com/2010-04-01")
    /// - `RELAY__TELEPHONY__VOICE_URL` (optional)
    pub fn from_env() -> Result<Self> {
        Self::from_environment(environment())
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let config: RelayConfig = Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("video.api_base_url", "https://api.100ms.live/v2")?
            .set_default("video.management_token_expiry", 86400)?
            .set_default("video.auth_token_expiry", 86400)?
            .set_default("video.page_limit", DEFAULT_PAGE_LIMIT as i64)?
            .set_default("video.max_pages", 500)?
            .set_default("video.guest_role", "guest")?
            .set_default(
                "telephony.api_base_url",
                "https://api.twilio.com/2010-04-01",
            )?
            .add_source(environment)
            .build()
            .context("Failed to assemble relay configuration")?
            .try_deserialize()
            .context("Invalid relay configuration")?;

        if config.video.page_limit == 0 {
            anyhow::bail!("video.page_limit must be greater than zero");
        }

        if config.video.max_pages == 0 {
            anyhow::bail!("video.max_pages must be greater than zero");
        }

        Ok(config)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("RELAY").separator("__")
}
