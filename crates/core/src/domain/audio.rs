use serde::{Deserialize, Serialize};

/// Audio autoplay gate.
///
/// Browsers (and some embedded runtimes) refuse unprompted audio playback
/// until a user gesture occurs. The transport reports the current
/// capability; `audio_playback_blocked` is always the negation of
/// `can_play_audio` so consumers can bind a "enable audio" affordance to it
/// directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AudioGate {
    pub can_play_audio: bool,
    pub audio_playback_blocked: bool,
}

impl AudioGate {
    pub fn from_capability(can_play: bool) -> Self {
        Self {
            can_play_audio: can_play,
            audio_playback_blocked: !can_play,
        }
    }

    /// Recompute the gate from a transport capability report.
    pub fn recompute(&mut self, can_play: bool) {
        self.can_play_audio = can_play;
        self.audio_playback_blocked = !can_play;
    }

    /// Mark audio as explicitly started (a successful start-audio action).
    pub fn mark_started(&mut self) {
        self.recompute(true);
    }
}

impl Default for AudioGate {
    fn default() -> Self {
        Self::from_capability(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_blocked() {
        let gate = AudioGate::default();
        assert!(!gate.can_play_audio);
        assert!(gate.audio_playback_blocked);
    }

    #[test]
    fn test_recompute_keeps_fields_inverted() {
        let mut gate = AudioGate::default();
        gate.recompute(true);
        assert!(gate.can_play_audio);
        assert!(!gate.audio_playback_blocked);

        gate.recompute(false);
        assert!(!gate.can_play_audio);
        assert!(gate.audio_playback_blocked);
    }

    #[test]
    fn test_mark_started() {
        let mut gate = AudioGate::default();
        gate.mark_started();
        assert!(gate.can_play_audio);
        assert!(!gate.audio_playback_blocked);
    }
}
