//! Repositories over the video provider's Resource API

use std::sync::Arc;

use common::{ResourceApi, UpstreamError, UpstreamResult};
use serde_json::{Value, json};

use crate::{
    enrichment::enrich_rooms,
    models::{
        room::{EnrichedRoomList, RoomList, RoomToggle},
        session::Session,
    },
    pagination::{PaginationError, PaginationWalker},
};

/// Room repository for provider operations
#[derive(Clone)]
pub struct RoomRepository {
    api: Arc<dyn ResourceApi>,
    guest_role: String,
}

impl RoomRepository {
    /// Create a new room repository
    pub fn new(api: Arc<dyn ResourceApi>, guest_role: impl Into<String>) -> Self {
        Self {
            api,
            guest_role: guest_role.into(),
        }
    }

    /// Create a room from a provider room definition
    pub async fn create(&self, definition: &Value) -> UpstreamResult<Value> {
        self.api.post("/rooms", definition).await
    }

    /// Enable or disable a room
    pub async fn set_enabled(&self, toggle: &RoomToggle) -> UpstreamResult<Value> {
        self.api
            .post(
                &format!("/rooms/{}", toggle.room_id),
                &json!({ "enabled": toggle.enabled }),
            )
            .await
    }

    /// List rooms, each with its guest room codes attached
    pub async fn list_with_guest_codes(&self) -> UpstreamResult<EnrichedRoomList> {
        let body = self.api.get("/rooms", &[]).await?;
        let list: RoomList = serde_json::from_value(body).map_err(UpstreamError::from)?;

        let data = match list.data {
            Some(rooms) => Some(enrich_rooms(self.api.as_ref(), rooms, &self.guest_role).await),
            None => None,
        };

        Ok(EnrichedRoomList {
            data,
            extra: list.extra,
        })
    }
}

/// Session repository for provider operations
#[derive(Clone)]
pub struct SessionRepository {
    api: Arc<dyn ResourceApi>,
    page_limit: usize,
    max_pages: usize,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(api: Arc<dyn ResourceApi>, page_limit: usize, max_pages: usize) -> Self {
        Self {
            api,
            page_limit,
            max_pages,
        }
    }

    /// Get every session of a room, across all pages
    pub async fn list_by_room(&self, room_id: &str) -> Result<Vec<Value>, PaginationError> {
        PaginationWalker::new(self.api.as_ref(), self.page_limit, self.max_pages)
            .fetch_all("/sessions", &[room_filter(room_id)])
            .await
    }

    /// Get the most recent session of a room, if it has any
    pub async fn latest_by_room(&self, room_id: &str) -> UpstreamResult<Option<Session>> {
        let body = self.api.get("/sessions", &[room_filter(room_id)]).await?;

        let first = match body.get("data").and_then(Value::as_array) {
            Some(sessions) => sessions.first().cloned(),
            None => None,
        };

        match first {
            Some(session) => Ok(Some(serde_json::from_value(session)?)),
            None => Ok(None),
        }
    }
}

fn room_filter(room_id: &str) -> (String, String) {
    ("room_id".to_string(), room_id.to_string())
}
