//! Telephony call models

use serde::{Deserialize, Serialize};

/// Request to place an outbound call
#[derive(Debug, Clone, Deserialize)]
pub struct CallRequest {
    pub to: Option<String>,
    pub from: Option<String>,
    /// URL the provider fetches call instructions from
    pub url: Option<String>,
}

/// Validated outbound call, in the provider's form field names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundCall {
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Url")]
    pub url: String,
}
