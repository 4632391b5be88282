//! Request and response payloads for the relay's HTTP surface

use serde::{Deserialize, Serialize};

pub mod call;
pub mod room;
pub mod session;

/// Request for an auth token
///
/// Fields are optional here so that a missing one is reported as a
/// validation error rather than a JSON rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokenRequest {
    pub room_id: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<String>,
}

/// Response for auth token generation
#[derive(Debug, Serialize)]
pub struct AuthTokenResponse {
    pub token: String,
}

/// Query parameters naming a room
#[derive(Debug, Clone, Deserialize)]
pub struct RoomQuery {
    pub room_id: Option<String>,
}
