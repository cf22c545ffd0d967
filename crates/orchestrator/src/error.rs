use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Invalid connection transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Session provisioning error: {0}")]
    Presence(#[from] presence::PresenceError),

    #[error("Transport error: {0}")]
    Transport(#[from] transport::TransportError),
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_transport_error() {
        let error: ViewerError = transport::TransportError::NoActiveConnection.into();
        assert!(error.to_string().contains("No active room connection"));
    }

    #[test]
    fn test_wraps_presence_error() {
        let error: ViewerError =
            presence::PresenceError::SessionCreation("timeout".to_string()).into();
        assert!(error.to_string().contains("timeout"));
    }
}
