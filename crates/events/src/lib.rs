//! Event system for the presence viewer.
//!
//! The orchestration core republishes every state change through the
//! [`EventBus`]; presentation layers subscribe and render from the stream
//! plus periodic snapshots.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
