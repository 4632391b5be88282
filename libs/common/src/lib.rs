//! Common library for the relay
//!
//! This crate provides the upstream plumbing shared by every outbound
//! client: the Resource API abstraction, its HTTP implementation, and the
//! error type they report through.

pub mod error;
pub mod upstream;

pub use error::{UpstreamError, UpstreamResult};
pub use upstream::{CredentialSource, HttpResourceApi, ResourceApi};
