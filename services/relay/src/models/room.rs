//! Room models
//!
//! Rooms and room codes are owned by the upstream provider. Only the fields
//! the relay reads are typed; everything else is carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Room record as listed by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Room list envelope as returned by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct RoomList {
    #[serde(default)]
    pub data: Option<Vec<Room>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Join code bound to a room and role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomCode {
    pub code: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Room code list envelope as returned by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct RoomCodeList {
    #[serde(default)]
    pub data: Option<Vec<RoomCode>>,
}

/// Room with its guest join codes attached
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedRoom {
    #[serde(flatten)]
    pub room: Room,
    pub guest_room_codes: Vec<RoomCode>,
    /// Set when the room codes could not be fetched
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub guest_room_codes_error: bool,
}

/// Room list with enriched items, keeping the provider's envelope fields
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedRoomList {
    /// Absent when the provider sent no list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<EnrichedRoom>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request to enable or disable a room
#[derive(Debug, Clone)]
pub struct RoomToggle {
    pub room_id: String,
    pub enabled: bool,
}
