//! Error types shared by every upstream client
//!
//! Any call that leaves the process (video Resource API, telephony API)
//! reports failure through [`UpstreamError`].

use serde_json::Value;
use thiserror::Error;

/// Failure of an outbound call to an upstream provider
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Upstream answered with a non-2xx status
    #[error("Upstream responded with status {status}")]
    Status {
        status: u16,
        /// Response body, JSON when the upstream sent JSON
        body: Option<Value>,
    },

    /// Request never produced a response
    #[error("Upstream transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Response body could not be decoded into the expected shape
    #[error("Upstream response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Bearer credential could not be produced
    #[error("Upstream credential error: {0}")]
    Credential(String),
}

impl UpstreamError {
    /// Status code reported by the upstream, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Type alias for Result with UpstreamError
pub type UpstreamResult<T> = Result<T, UpstreamError>;
