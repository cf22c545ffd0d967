use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }
}

/// A subscribed remote media track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackHandle {
    /// Transport-assigned track id
    pub id: String,
    pub kind: TrackKind,
    /// Room identity of the participant publishing the track
    pub publisher: String,
}

impl TrackHandle {
    pub fn new(id: impl Into<String>, kind: TrackKind, publisher: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            publisher: publisher.into(),
        }
    }
}
