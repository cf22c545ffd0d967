use serde::{Deserialize, Serialize};

use super::audio::AudioGate;
use super::connection::ConnectionState;
use super::session::Session;
use super::track::TrackHandle;

/// Immutable snapshot of the orchestration core's state, handed to
/// consumers (the presentation layer). Mutating a snapshot has no effect on
/// the core.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ViewerSnapshot {
    pub connection: ConnectionState,
    pub session: Option<Session>,
    /// Subscribed video tracks, stable insertion order
    pub video_tracks: Vec<TrackHandle>,
    /// Subscribed audio tracks, stable insertion order
    pub audio_tracks: Vec<TrackHandle>,
    pub audio: AudioGate,
}
