//! Room transport boundary.
//!
//! The real-time media room itself (connection establishment, signaling,
//! track delivery) is an external collaborator. This crate defines the
//! trait boundary the orchestration core consumes ([`RoomTransport`],
//! [`RoomHandle`], [`RoomEvent`]) and the [`RoomManager`] that owns the
//! single live connection.

pub mod error;
pub mod manager;
pub mod room;

pub use error::{Result, TransportError};
pub use manager::{ConnectedRoom, RoomManager};
pub use room::{RoomEvent, RoomHandle, RoomOptions, RoomTransport};
