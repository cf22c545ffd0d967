use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Inactive,
    Expired,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// A provider-side avatar session bound to one media room.
///
/// Created by the session provisioner on connect and destroyed (best-effort)
/// on disconnect. The orchestration core owns the session exclusively for
/// its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Provider-issued session id
    pub id: String,
    /// Avatar this session renders
    pub avatar_id: String,
    /// Room URL the avatar publishes into
    pub transport_url: String,
    /// Opaque credential for joining the room
    pub transport_credential: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session's expiry timestamp has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_session(ttl_minutes: i64) -> Session {
        Session {
            id: "sess-1".to_string(),
            avatar_id: "avatar-a".to_string(),
            transport_url: "wss://room.example".to_string(),
            transport_credential: "tok1".to_string(),
            status: SessionStatus::Active,
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::minutes(ttl_minutes),
        }
    }

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(SessionStatus::Active.as_str(), "active");
        assert_eq!(SessionStatus::parse("expired"), Some(SessionStatus::Expired));
        assert_eq!(SessionStatus::parse("bogus"), None);
    }

    #[test]
    fn test_expiry_comparison() {
        let session = sample_session(5);
        assert!(!session.is_expired_at(Utc::now()));
        assert!(session.is_expired_at(Utc::now() + Duration::minutes(10)));
    }

    #[test]
    fn test_session_deserializes_from_provider_payload() {
        let payload = r#"{
            "id": "sess-9",
            "avatar_id": "avatar-a",
            "transport_url": "wss://room.example",
            "transport_credential": "tok1",
            "status": "active",
            "created_at": "2026-01-01T00:00:00Z",
            "expires_at": "2026-01-01T01:00:00Z"
        }"#;
        let session: Session = serde_json::from_str(payload).unwrap();
        assert_eq!(session.id, "sess-9");
        assert_eq!(session.status, SessionStatus::Active);
    }
}
