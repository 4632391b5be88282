//! Token service for the video provider
//!
//! This module signs the two HS256 tokens the provider understands:
//! management tokens that authorize Resource API calls, and auth tokens
//! that let a client join a room with a given role.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use async_trait::async_trait;
use common::{CredentialSource, UpstreamError, UpstreamResult};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::VideoConfig;

/// Claim format version expected by the provider
const TOKEN_VERSION: u8 = 2;

/// A cached management token is replaced once it has less than this many seconds left
const MANAGEMENT_TOKEN_REFRESH_MARGIN: u64 = 60;

/// Token configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Access key embedded in every token
    pub access_key: String,
    /// Shared secret for signing tokens
    pub app_secret: String,
    /// Management token expiration time in seconds
    pub management_token_expiry: u64,
    /// Auth token expiration time in seconds
    pub auth_token_expiry: u64,
}

impl From<&VideoConfig> for TokenConfig {
    fn from(video: &VideoConfig) -> Self {
        Self {
            access_key: video.access_key.clone(),
            app_secret: video.app_secret.clone(),
            management_token_expiry: video.management_token_expiry,
            auth_token_expiry: video.auth_token_expiry,
        }
    }
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Server-to-server management token
    Management,
    /// Room join token for client applications
    App,
}

/// Management token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct ManagementClaims {
    pub access_key: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub version: u8,
    pub iat: u64,
    pub nbf: u64,
    pub exp: u64,
    pub jti: String,
}

/// Auth token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthClaims {
    pub access_key: String,
    pub room_id: String,
    pub user_id: String,
    pub role: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub version: u8,
    pub iat: u64,
    pub nbf: u64,
    pub exp: u64,
    pub jti: String,
}

/// Inputs for an auth token
#[derive(Debug, Clone)]
pub struct AuthTokenGrant {
    pub room_id: String,
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    exp: u64,
}

/// Token service
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    config: TokenConfig,
    management_token: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenService {
    /// Initialize a new token service
    pub fn new(config: TokenConfig) -> Result<Self> {
        if config.app_secret.is_empty() {
            anyhow::bail!("Token signing secret must not be empty");
        }

        let encoding_key = EncodingKey::from_secret(config.app_secret.as_bytes());

        Ok(TokenService {
            encoding_key,
            config,
            management_token: Arc::new(Mutex::new(None)),
        })
    }

    /// Return a management token, reusing the cached one while it is still fresh
    pub async fn issue_management_token(&self) -> Result<String> {
        let mut cached = self.management_token.lock().await;
        let now = now_secs()?;

        if let Some(token) = cached.as_ref() {
            if token.exp > now + MANAGEMENT_TOKEN_REFRESH_MARGIN {
                return Ok(token.token.clone());
            }
        }

        let exp = now + self.config.management_token_expiry;
        let claims = ManagementClaims {
            access_key: self.config.access_key.clone(),
            token_type: TokenType::Management,
            version: TOKEN_VERSION,
            iat: now,
            nbf: now,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        info!("Issued new management token expiring at {}", exp);

        *cached = Some(CachedToken {
            token: token.clone(),
            exp,
        });

        Ok(token)
    }

    /// Generate an auth token that lets `user_id` join `room_id` as `role`
    pub fn issue_auth_token(&self, grant: &AuthTokenGrant) -> Result<String> {
        if grant.room_id.is_empty() || grant.user_id.is_empty() || grant.role.is_empty() {
            anyhow::bail!("room_id, user_id and role are required");
        }

        let now = now_secs()?;
        let claims = AuthClaims {
            access_key: self.config.access_key.clone(),
            room_id: grant.room_id.clone(),
            user_id: grant.user_id.clone(),
            role: grant.role.clone(),
            token_type: TokenType::App,
            version: TOKEN_VERSION,
            iat: now,
            nbf: now,
            exp: now + self.config.auth_token_expiry,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }
}

#[async_trait]
impl CredentialSource for TokenService {
    async fn bearer_token(&self) -> UpstreamResult<String> {
        self.issue_management_token().await.map_err(|e| {
            error!("Failed to issue management token: {}", e);
            UpstreamError::Credential(e.to_string())
        })
    }
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
        .as_secs())
}
