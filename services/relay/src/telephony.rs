//! Telephony provider client
//!
//! Thin pass-through to the provider's call resources, authenticated with
//! the account's basic-auth credentials.

use common::{UpstreamError, UpstreamResult, upstream::read_json};
use serde_json::Value;
use tracing::info;

use crate::{config::TelephonyConfig, models::call::OutboundCall};

/// Telephony client
#[derive(Clone)]
pub struct TelephonyClient {
    client: reqwest::Client,
    config: TelephonyConfig,
}

impl TelephonyClient {
    /// Create a new telephony client
    pub fn new(client: reqwest::Client, config: TelephonyConfig) -> Self {
        Self { client, config }
    }

    /// Caller number used when a request names none
    pub fn default_from(&self) -> &str {
        &self.config.from_number
    }

    /// Call-instructions URL used when a request names none
    pub fn default_voice_url(&self) -> Option<&str> {
        self.config.voice_url.as_deref()
    }

    fn account_url(&self, resource: &str) -> String {
        format!(
            "{}/Accounts/{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.account_sid,
            resource
        )
    }

    /// Place an outbound call
    pub async fn initiate_call(&self, call: &OutboundCall) -> UpstreamResult<Value> {
        info!("Initiating call to {}", call.to);

        let response = self
            .client
            .post(self.account_url("Calls.json"))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(call)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        read_json(response).await
    }

    /// Get the current state of a call
    pub async fn call_status(&self, call_sid: &str) -> UpstreamResult<Value> {
        let response = self
            .client
            .get(self.account_url(&format!("Calls/{}.json", call_sid)))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        read_json(response).await
    }
}
