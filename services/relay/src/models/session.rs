//! Session models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session record with its peer connections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub room_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Peers keyed by peer id
    #[serde(default)]
    pub peers: BTreeMap<String, Peer>,
}

/// One connection of a user within a session
///
/// A user who reconnects shows up as several peers sharing a `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub left_at: Option<DateTime<Utc>>,
}

/// Per-user connected time within one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDurationSummary {
    pub name: String,
    pub user_id: String,
    #[serde(rename = "duration")]
    pub duration_minutes: f64,
}

/// Usage metrics for one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionAnalytics {
    pub user_duration_list: Vec<UserDurationSummary>,
    /// Wall-clock span of the session, minutes with two decimals
    pub session_duration: String,
    /// Sum of every user's connected time, minutes with two decimals
    pub total_peer_duration: String,
}
