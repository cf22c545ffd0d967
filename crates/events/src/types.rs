//! Event types emitted by the orchestration core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use viewer_core::{ConnectionPhase, TrackKind};

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: ViewerEvent,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(event: ViewerEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// All events published by the orchestration core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerEvent {
    // Connection events
    /// The connection state machine moved to a new phase
    #[serde(rename = "connection.state_changed")]
    ConnectionStateChanged {
        from: ConnectionPhase,
        to: ConnectionPhase,
        error: Option<String>,
    },

    /// A reconnect attempt has been scheduled
    #[serde(rename = "connection.reconnect_scheduled")]
    ReconnectScheduled { attempt: u32, delay_ms: u64 },

    // Session events
    /// An avatar session was provisioned
    #[serde(rename = "session.created")]
    SessionCreated { session_id: String, avatar_id: String },

    /// An avatar session was destroyed
    #[serde(rename = "session.destroyed")]
    SessionDestroyed { session_id: String },

    // Track events
    /// A remote track was subscribed
    #[serde(rename = "track.subscribed")]
    TrackSubscribed {
        track_id: String,
        kind: TrackKind,
        publisher: String,
    },

    /// A remote track was unsubscribed
    #[serde(rename = "track.unsubscribed")]
    TrackUnsubscribed { track_id: String },

    // Audio events
    /// The audio autoplay gate was recomputed
    #[serde(rename = "audio.gate_changed")]
    AudioGateChanged {
        can_play_audio: bool,
        audio_playback_blocked: bool,
    },

    /// The transport reported a media-level error
    #[serde(rename = "media.error")]
    MediaError { message: String },
}

impl ViewerEvent {
    /// Track id carried by the event, if any (used by consumers that key
    /// rendering surfaces by track)
    pub fn track_id(&self) -> Option<&str> {
        match self {
            Self::TrackSubscribed { track_id, .. } | Self::TrackUnsubscribed { track_id } => {
                Some(track_id)
            }
            _ => None,
        }
    }
}
