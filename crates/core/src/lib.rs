//! Core domain types for the presence viewer.
//!
//! This crate holds the data model shared by every other crate: the avatar
//! session, the connection state machine's state, subscribed track handles,
//! and the audio autoplay gate.

pub mod domain;

pub use domain::audio::AudioGate;
pub use domain::connection::{ConnectionPhase, ConnectionState};
pub use domain::session::{Session, SessionStatus};
pub use domain::snapshot::ViewerSnapshot;
pub use domain::track::{TrackHandle, TrackKind};
