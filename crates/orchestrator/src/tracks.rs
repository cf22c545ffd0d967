use viewer_core::{TrackHandle, TrackKind};

/// Bookkeeping for subscribed remote tracks.
///
/// Video and audio tracks live in separate insertion-ordered collections
/// keyed by track id. Subscription is idempotent per id; teardown drains
/// both collections deterministically.
#[derive(Debug, Default)]
pub struct TrackRegistry {
    video: Vec<TrackHandle>,
    audio: Vec<TrackHandle>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a subscribed track. Returns false (and keeps the existing
    /// handle) if a track with the same id is already registered.
    pub fn subscribe(&mut self, handle: TrackHandle) -> bool {
        if self.contains(&handle.id) {
            return false;
        }
        match handle.kind {
            TrackKind::Video => self.video.push(handle),
            TrackKind::Audio => self.audio.push(handle),
        }
        true
    }

    /// Remove the track with the given id from whichever collection holds
    /// it, returning the handle so the caller can release its attachment.
    pub fn unsubscribe(&mut self, track_id: &str) -> Option<TrackHandle> {
        if let Some(pos) = self.video.iter().position(|t| t.id == track_id) {
            return Some(self.video.remove(pos));
        }
        if let Some(pos) = self.audio.iter().position(|t| t.id == track_id) {
            return Some(self.audio.remove(pos));
        }
        None
    }

    /// Drain both collections, returning every handle for release. The
    /// registry is empty afterwards regardless of what the caller does
    /// with the handles.
    pub fn clear(&mut self) -> Vec<TrackHandle> {
        let mut drained = Vec::with_capacity(self.video.len() + self.audio.len());
        drained.append(&mut self.video);
        drained.append(&mut self.audio);
        drained
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.video.iter().any(|t| t.id == track_id) || self.audio.iter().any(|t| t.id == track_id)
    }

    pub fn video(&self) -> &[TrackHandle] {
        &self.video
    }

    pub fn audio(&self) -> &[TrackHandle] {
        &self.audio
    }

    pub fn len(&self) -> usize {
        self.video.len() + self.audio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.video.is_empty() && self.audio.is_empty()
    }
}
