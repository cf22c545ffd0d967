use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session creation failed: {0}")]
    SessionCreation(String),

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, PresenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = PresenceError::SessionCreation("401 unauthorized".to_string());
        assert!(error.to_string().contains("401 unauthorized"));
    }
}
