//! In-process simulation of the presence service and the media room.
//!
//! Lets the viewer run end to end without external services: the simulated
//! provider hands out sessions, and the simulated room plays a short script
//! of lifecycle and track events after "connecting".

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use presence::{AvatarSessionProvider, CreateSessionRequest};
use transport::{RoomEvent, RoomHandle, RoomOptions, RoomTransport};
use viewer_core::{Session, SessionStatus, TrackKind};

const SESSION_TTL_MINUTES: i64 = 30;

/// Simulated presence service. Sessions are numbered and expire after a
/// fixed TTL like the real service's.
pub struct SimProvider {
    counter: AtomicUsize,
}

impl SimProvider {
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AvatarSessionProvider for SimProvider {
    async fn create_session(&self, request: &CreateSessionRequest) -> presence::Result<Session> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(avatar_id = %request.avatar_id, "simulated session created");
        Ok(Session {
            id: format!("sim-session-{}", n),
            avatar_id: request.avatar_id.clone(),
            transport_url: request.transport_url.clone(),
            transport_credential: request.transport_credential.clone(),
            status: SessionStatus::Active,
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::minutes(SESSION_TTL_MINUTES),
        })
    }

    async fn destroy_session(&self, session_id: &str) -> presence::Result<()> {
        debug!(session_id = %session_id, "simulated session destroyed");
        Ok(())
    }
}

struct SimRoomHandle {
    events: Mutex<Option<mpsc::Receiver<RoomEvent>>>,
    audio_allowed: bool,
}

#[async_trait]
impl RoomHandle for SimRoomHandle {
    async fn take_events(&self) -> Option<mpsc::Receiver<RoomEvent>> {
        self.events.lock().await.take()
    }

    fn audio_playback_allowed(&self) -> bool {
        self.audio_allowed
    }

    async fn start_audio(&self) -> transport::Result<()> {
        Ok(())
    }

    async fn release_track(&self, track_id: &str) -> transport::Result<()> {
        debug!(track_id = %track_id, "simulated track released");
        Ok(())
    }

    async fn disconnect(&self) -> transport::Result<()> {
        Ok(())
    }
}

/// Simulated room transport. Every connect succeeds and the avatar
/// "publishes" a video and an audio track shortly after.
pub struct SimRoomTransport {
    avatar_identity: String,
}

impl SimRoomTransport {
    pub fn new(avatar_identity: impl Into<String>) -> Self {
        Self {
            avatar_identity: avatar_identity.into(),
        }
    }
}

#[async_trait]
impl RoomTransport for SimRoomTransport {
    async fn connect(
        &self,
        url: &str,
        _credential: &str,
        _options: &RoomOptions,
    ) -> transport::Result<Arc<dyn RoomHandle>> {
        debug!(url = %url, "simulated room connect");
        let (tx, rx) = mpsc::channel(32);

        let publisher = self.avatar_identity.clone();
        tokio::spawn(async move {
            let script = [
                RoomEvent::Connected,
                RoomEvent::TrackSubscribed {
                    id: "sim-video-0".to_string(),
                    kind: TrackKind::Video,
                    publisher: publisher.clone(),
                },
                RoomEvent::TrackSubscribed {
                    id: "sim-audio-0".to_string(),
                    kind: TrackKind::Audio,
                    publisher,
                },
                RoomEvent::AudioCapabilityChanged { can_play: true },
            ];
            for event in script {
                tokio::time::sleep(Duration::from_millis(200)).await;
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        });

        Ok(Arc::new(SimRoomHandle {
            events: Mutex::new(Some(rx)),
            audio_allowed: false,
        }))
    }
}
