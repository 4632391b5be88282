use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod analytics;
mod config;
mod enrichment;
mod error;
mod models;
mod pagination;
mod repositories;
mod routes;
mod state;
mod telephony;
#[cfg(test)]
mod testutils;
mod token;
mod validation;

use common::HttpResourceApi;

use crate::{
    config::RelayConfig,
    repositories::{RoomRepository, SessionRepository},
    state::AppState,
    telephony::TelephonyClient,
    token::{TokenConfig, TokenService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting relay service");

    let config = RelayConfig::from_env()?;
    info!(
        "Video API at {}, telephony API at {}",
        config.video.api_base_url, config.telephony.api_base_url
    );

    // Collaborators are built once and shared by every request
    let token_service = TokenService::new(TokenConfig::from(&config.video))?;
    let http_client = reqwest::Client::new();

    let resource_api = Arc::new(HttpResourceApi::with_client(
        http_client.clone(),
        config.video.api_base_url.clone(),
        Arc::new(token_service.clone()),
    ));

    let app_state = AppState {
        token_service,
        room_repository: RoomRepository::new(
            resource_api.clone(),
            config.video.guest_role.clone(),
        ),
        session_repository: SessionRepository::new(
            resource_api,
            config.video.page_limit,
            config.video.max_pages,
        ),
        telephony: TelephonyClient::new(http_client, config.telephony.clone()),
    };

    info!("Relay service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Relay service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
