//! Session provisioner.
//!
//! Thin policy layer over the provider: uniform error wrapping on create,
//! best-effort destroy, expiry checks, and refresh for expired sessions.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use viewer_core::Session;

use crate::error::{PresenceError, Result};
use crate::types::{AvatarSessionProvider, CreateSessionRequest};

#[derive(Clone)]
pub struct SessionProvisioner {
    provider: Arc<dyn AvatarSessionProvider>,
}

impl SessionProvisioner {
    pub fn new(provider: Arc<dyn AvatarSessionProvider>) -> Self {
        Self { provider }
    }

    /// Provision a new avatar session.
    ///
    /// Any provider failure (network, authentication, validation) is
    /// reported uniformly as [`PresenceError::SessionCreation`] wrapping
    /// the underlying cause.
    pub async fn create_session(&self, request: &CreateSessionRequest) -> Result<Session> {
        match self.provider.create_session(request).await {
            Ok(session) => {
                info!(
                    session_id = %session.id,
                    avatar_id = %session.avatar_id,
                    "avatar session provisioned"
                );
                Ok(session)
            }
            Err(PresenceError::SessionCreation(cause)) => {
                Err(PresenceError::SessionCreation(cause))
            }
            Err(e) => Err(PresenceError::SessionCreation(e.to_string())),
        }
    }

    /// Destroy a session. Best-effort: callers must treat failure as
    /// non-fatal and proceed with local cleanup regardless.
    pub async fn destroy_session(&self, session_id: &str) -> Result<()> {
        self.provider.destroy_session(session_id).await
    }

    /// Whether the session's expiry timestamp has passed.
    pub fn is_expired(&self, session: &Session) -> bool {
        session.is_expired_at(Utc::now())
    }

    /// Replace an expired session: destroy the old one (ignoring failure)
    /// and create a fresh one for the same avatar.
    pub async fn refresh_session(
        &self,
        expired: &Session,
        request: &CreateSessionRequest,
    ) -> Result<Session> {
        if let Err(e) = self.destroy_session(&expired.id).await {
            warn!(session_id = %expired.id, error = %e, "destroying expired session failed");
        }
        self.create_session(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use viewer_core::SessionStatus;

    fn sample_session(id: &str, ttl_minutes: i64) -> Session {
        Session {
            id: id.to_string(),
            avatar_id: "avatar-a".to_string(),
            transport_url: "wss://room.example".to_string(),
            transport_credential: "tok1".to_string(),
            status: SessionStatus::Active,
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::minutes(ttl_minutes),
        }
    }

    fn sample_request() -> CreateSessionRequest {
        CreateSessionRequest::new("avatar-a", "wss://room.example", "tok1")
    }

    struct FakeProvider {
        fail_create: bool,
        fail_destroy: bool,
        creates: AtomicUsize,
        destroys: AtomicUsize,
    }

    impl FakeProvider {
        fn new(fail_create: bool, fail_destroy: bool) -> Self {
            Self {
                fail_create,
                fail_destroy,
                creates: AtomicUsize::new(0),
                destroys: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AvatarSessionProvider for FakeProvider {
        async fn create_session(&self, _request: &CreateSessionRequest) -> Result<Session> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                Err(PresenceError::InvalidResponse("Status 401: nope".to_string()))
            } else {
                Ok(sample_session("sess-new", 30))
            }
        }

        async fn destroy_session(&self, _session_id: &str) -> Result<()> {
            self.destroys.fetch_add(1, Ordering::SeqCst);
            if self.fail_destroy {
                Err(PresenceError::SessionNotFound("gone".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_create_wraps_provider_failure() {
        let provisioner = SessionProvisioner::new(Arc::new(FakeProvider::new(true, false)));
        let result = provisioner.create_session(&sample_request()).await;
        match result {
            Err(PresenceError::SessionCreation(cause)) => assert!(cause.contains("401")),
            other => panic!("unexpected result: {:?}", other.map(|s| s.id)),
        }
    }

    #[tokio::test]
    async fn test_create_success() {
        let provisioner = SessionProvisioner::new(Arc::new(FakeProvider::new(false, false)));
        let session = provisioner.create_session(&sample_request()).await.unwrap();
        assert_eq!(session.id, "sess-new");
    }

    #[test]
    fn test_is_expired() {
        let provisioner = SessionProvisioner::new(Arc::new(FakeProvider::new(false, false)));
        assert!(!provisioner.is_expired(&sample_session("s", 30)));
        assert!(provisioner.is_expired(&sample_session("s", -1)));
    }

    #[tokio::test]
    async fn test_refresh_proceeds_past_failing_destroy() {
        let provider = Arc::new(FakeProvider::new(false, true));
        let provisioner = SessionProvisioner::new(provider.clone());

        let expired = sample_session("sess-old", -5);
        let refreshed = provisioner
            .refresh_session(&expired, &sample_request())
            .await
            .unwrap();

        assert_eq!(refreshed.id, "sess-new");
        assert_eq!(provider.destroys.load(Ordering::SeqCst), 1);
        assert_eq!(provider.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_propagates_create_failure() {
        let provisioner = SessionProvisioner::new(Arc::new(FakeProvider::new(true, false)));
        let expired = sample_session("sess-old", -5);
        let result = provisioner.refresh_session(&expired, &sample_request()).await;
        assert!(matches!(result, Err(PresenceError::SessionCreation(_))));
    }
}
