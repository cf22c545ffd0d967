use viewer_core::ConnectionPhase;

use crate::error::{Result, ViewerError};

/// Validates connection phase transitions.
///
/// `Disconnected` is reachable from every phase (an explicit disconnect
/// always wins); `Failed` is terminal until an explicit connect retry.
pub struct ConnectionStateMachine;

impl ConnectionStateMachine {
    pub fn validate_transition(from: &ConnectionPhase, to: &ConnectionPhase) -> Result<()> {
        let allowed = Self::allowed_transitions(from);

        if allowed.contains(to) {
            Ok(())
        } else {
            Err(ViewerError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }

    fn allowed_transitions(from: &ConnectionPhase) -> Vec<ConnectionPhase> {
        match from {
            ConnectionPhase::Disconnected => vec![ConnectionPhase::Connecting],
            ConnectionPhase::Connecting => vec![
                ConnectionPhase::Connected,
                ConnectionPhase::Failed,
                ConnectionPhase::Disconnected,
            ],
            ConnectionPhase::Connected => vec![
                ConnectionPhase::Reconnecting,
                ConnectionPhase::Disconnected,
            ],
            ConnectionPhase::Reconnecting => vec![
                ConnectionPhase::Connected,
                ConnectionPhase::Failed,
                ConnectionPhase::Disconnected,
            ],
            ConnectionPhase::Failed => vec![
                ConnectionPhase::Connecting,
                ConnectionPhase::Disconnected,
            ],
        }
    }

    pub fn can_transition(from: &ConnectionPhase, to: &ConnectionPhase) -> bool {
        Self::validate_transition(from, to).is_ok()
    }
}
