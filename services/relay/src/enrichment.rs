//! Fan-out enrichment of room listings
//!
//! Every room gets its own room-code request. All requests run at once and
//! are joined in full; a failed request degrades only its own room.

use std::future::Future;

use common::{ResourceApi, UpstreamError, UpstreamResult};
use futures::future::join_all;
use tracing::error;

use crate::models::room::{EnrichedRoom, Room, RoomCode, RoomCodeList};

/// Run `fetch` for every item concurrently and wait for all of them
///
/// Results come back in input order regardless of completion order.
pub async fn fan_out<'a, T, R, F, Fut>(items: &'a [T], fetch: F) -> Vec<UpstreamResult<R>>
where
    F: Fn(&'a T) -> Fut,
    Fut: Future<Output = UpstreamResult<R>>,
{
    join_all(items.iter().map(fetch)).await
}

/// Fetch the room codes of one room
pub async fn fetch_room_codes(
    api: &dyn ResourceApi,
    room_id: &str,
) -> UpstreamResult<Vec<RoomCode>> {
    let body = api.get(&format!("/room-codes/room/{}", room_id), &[]).await?;
    let list: RoomCodeList = serde_json::from_value(body).map_err(UpstreamError::from)?;
    Ok(list.data.unwrap_or_default())
}

/// Attach each room's `guest_role` codes to it
pub async fn enrich_rooms(
    api: &dyn ResourceApi,
    rooms: Vec<Room>,
    guest_role: &str,
) -> Vec<EnrichedRoom> {
    if rooms.is_empty() {
        return Vec::new();
    }

    let results = fan_out(&rooms, |room| fetch_room_codes(api, &room.id)).await;

    rooms
        .into_iter()
        .zip(results)
        .map(|(room, result)| match result {
            Ok(codes) => EnrichedRoom {
                room,
                guest_room_codes: codes
                    .into_iter()
                    .filter(|code| code.role.as_deref() == Some(guest_role))
                    .collect(),
                guest_room_codes_error: false,
            },
            Err(e) => {
                error!("Failed to fetch room codes for room {}: {}", room.id, e);
                EnrichedRoom {
                    room,
                    guest_room_codes: Vec::new(),
                    guest_room_codes_error: true,
                }
            }
        })
        .collect()
}
