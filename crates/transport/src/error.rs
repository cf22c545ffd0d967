use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Room connection failed: {0}")]
    Connection(String),

    #[error("No active room connection")]
    NoActiveConnection,

    #[error("Track subscription failed: {0}")]
    Track(String),

    #[error("Audio playback failed: {0}")]
    AudioPlayback(String),

    #[error("Runtime does not support media playback: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = TransportError::Connection("dns failure".to_string());
        assert!(error.to_string().contains("dns failure"));
        assert_eq!(
            TransportError::NoActiveConnection.to_string(),
            "No active room connection"
        );
    }
}
