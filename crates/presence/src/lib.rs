//! Avatar session provider boundary.
//!
//! The presence service is the external system that, given an avatar id and
//! room credentials, spins up an avatar that publishes audio/video into the
//! room. This crate holds the HTTP client for that service, the
//! [`AvatarSessionProvider`] trait the orchestration core consumes, and the
//! [`SessionProvisioner`] that applies the error-wrapping and best-effort
//! semantics the core relies on.

pub mod client;
pub mod error;
pub mod provisioner;
pub mod types;

pub use client::PresenceClient;
pub use error::{PresenceError, Result};
pub use provisioner::SessionProvisioner;
pub use types::{AvatarSessionProvider, CreateSessionRequest};
