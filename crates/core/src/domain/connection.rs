use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection lifecycle phase. Transitions are driven only by the
/// orchestration core; consumers treat this as the single source of truth.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Failed,
}

impl ConnectionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "disconnected" => Some(Self::Disconnected),
            "connecting" => Some(Self::Connecting),
            "connected" => Some(Self::Connected),
            "reconnecting" => Some(Self::Reconnecting),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// True while a connection attempt or live connection exists.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected | Self::Reconnecting)
    }
}

/// Observable connection state: phase plus the last error, the timestamp of
/// the last successful connection, and the current reconnect attempt count.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConnectionState {
    pub phase: ConnectionPhase,
    pub last_error: Option<String>,
    pub last_connected_at: Option<DateTime<Utc>>,
    pub reconnect_attempts: u32,
}

impl ConnectionState {
    pub fn mark_connected(&mut self) {
        self.phase = ConnectionPhase::Connected;
        self.last_error = None;
        self.last_connected_at = Some(Utc::now());
        self.reconnect_attempts = 0;
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.phase = ConnectionPhase::Failed;
        self.last_error = Some(error.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_roundtrip() {
        for phase in [
            ConnectionPhase::Disconnected,
            ConnectionPhase::Connecting,
            ConnectionPhase::Connected,
            ConnectionPhase::Reconnecting,
            ConnectionPhase::Failed,
        ] {
            assert_eq!(ConnectionPhase::parse(phase.as_str()), Some(phase));
        }
    }

    #[test]
    fn test_is_active() {
        assert!(ConnectionPhase::Connecting.is_active());
        assert!(ConnectionPhase::Connected.is_active());
        assert!(ConnectionPhase::Reconnecting.is_active());
        assert!(!ConnectionPhase::Disconnected.is_active());
        assert!(!ConnectionPhase::Failed.is_active());
    }

    #[test]
    fn test_mark_connected_resets_attempts_and_error() {
        let mut state = ConnectionState {
            phase: ConnectionPhase::Reconnecting,
            last_error: Some("network".to_string()),
            last_connected_at: None,
            reconnect_attempts: 3,
        };
        state.mark_connected();
        assert_eq!(state.phase, ConnectionPhase::Connected);
        assert_eq!(state.reconnect_attempts, 0);
        assert!(state.last_error.is_none());
        assert!(state.last_connected_at.is_some());
    }

    #[test]
    fn test_mark_failed_records_error() {
        let mut state = ConnectionState::default();
        state.mark_failed("boom");
        assert_eq!(state.phase, ConnectionPhase::Failed);
        assert_eq!(state.last_error.as_deref(), Some("boom"));
    }
}
