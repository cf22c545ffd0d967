//! Room transport traits and the event stream they deliver.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use viewer_core::TrackKind;

use crate::error::Result;

/// Lifecycle and media events surfaced by a room connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// The connection is established
    Connected,
    /// The connection dropped without a caller-initiated disconnect
    Disconnected { reason: String },
    /// The transport is re-establishing the connection on its own
    Reconnecting,
    /// The transport re-established the connection on its own
    Reconnected,
    /// A remote track became available and was subscribed
    TrackSubscribed {
        id: String,
        kind: TrackKind,
        publisher: String,
    },
    /// A previously subscribed track went away
    TrackUnsubscribed { id: String },
    /// The runtime's audio autoplay capability changed
    AudioCapabilityChanged { can_play: bool },
    /// A playback or decode error on an attached track
    MediaError { message: String },
}

/// Options for joining a room.
#[derive(Debug, Clone)]
pub struct RoomOptions {
    /// Subscribe to remote tracks automatically as they are published
    pub auto_subscribe: bool,
    /// Identity this participant joins under
    pub identity: Option<String>,
    /// Display name for this participant
    pub name: Option<String>,
}

impl Default for RoomOptions {
    fn default() -> Self {
        Self {
            auto_subscribe: true,
            identity: None,
            name: None,
        }
    }
}

/// A single live room connection.
///
/// Implementations are expected to be internally synchronized; all methods
/// take `&self`.
#[async_trait]
pub trait RoomHandle: Send + Sync {
    /// Take the event receiver. Yields `Some` exactly once; the stream ends
    /// when the connection is closed.
    async fn take_events(&self) -> Option<mpsc::Receiver<RoomEvent>>;

    /// Whether the runtime currently permits unprompted audio playback.
    fn audio_playback_allowed(&self) -> bool;

    /// Ask the runtime to start audio playback (requires a prior user
    /// gesture in browser-like runtimes).
    async fn start_audio(&self) -> Result<()>;

    /// Release any playback attachment held for the given track.
    async fn release_track(&self, track_id: &str) -> Result<()>;

    /// Close the connection.
    async fn disconnect(&self) -> Result<()>;
}

/// Factory for room connections.
#[async_trait]
pub trait RoomTransport: Send + Sync {
    /// Open a connection to the room at `url`, authenticating with
    /// `credential`.
    async fn connect(
        &self,
        url: &str,
        credential: &str,
        options: &RoomOptions,
    ) -> Result<Arc<dyn RoomHandle>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_auto_subscribe() {
        let options = RoomOptions::default();
        assert!(options.auto_subscribe);
        assert!(options.identity.is_none());
    }

    #[test]
    fn test_room_event_serialization() {
        let event = RoomEvent::TrackSubscribed {
            id: "v1".to_string(),
            kind: TrackKind::Video,
            publisher: "avatar".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "track_subscribed");
        assert_eq!(json["kind"], "video");
    }
}
