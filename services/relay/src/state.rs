//! Application state shared across handlers

use crate::{
    repositories::{RoomRepository, SessionRepository},
    telephony::TelephonyClient,
    token::TokenService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub token_service: TokenService,
    pub room_repository: RoomRepository,
    pub session_repository: SessionRepository,
    pub telephony: TelephonyClient,
}
