use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use viewer_core::Session;

use crate::error::Result;

/// Request body for provisioning an avatar session.
///
/// The transport fields are the hint handed to the provider: the room the
/// avatar should publish into and a credential granting it access. The
/// provider answers with the session's own transport credentials for the
/// viewer side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateSessionRequest {
    pub avatar_id: String,
    pub transport_url: String,
    pub transport_credential: String,
}

impl CreateSessionRequest {
    pub fn new(
        avatar_id: impl Into<String>,
        transport_url: impl Into<String>,
        transport_credential: impl Into<String>,
    ) -> Self {
        Self {
            avatar_id: avatar_id.into(),
            transport_url: transport_url.into(),
            transport_credential: transport_credential.into(),
        }
    }
}

/// The external avatar session provider.
///
/// Both operations may fail with provider-specific errors; the provisioner
/// normalizes them for the orchestration core.
#[async_trait]
pub trait AvatarSessionProvider: Send + Sync {
    async fn create_session(&self, request: &CreateSessionRequest) -> Result<Session>;
    async fn destroy_session(&self, session_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = CreateSessionRequest::new("avatar-a", "wss://room.example", "tok1");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["avatar_id"], "avatar-a");
        assert_eq!(json["transport_url"], "wss://room.example");
    }
}
