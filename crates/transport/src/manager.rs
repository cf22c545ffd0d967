//! Room connection manager.
//!
//! Owns at most one live [`RoomHandle`] at a time. Connecting replaces any
//! prior connection; disconnecting always clears the local reference, even
//! when the underlying close call fails.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use crate::error::{Result, TransportError};
use crate::room::{RoomEvent, RoomHandle, RoomOptions, RoomTransport};

/// What a successful [`RoomManager::connect`] hands back to the caller.
pub struct ConnectedRoom {
    /// Stream of lifecycle and media events for this connection
    pub events: mpsc::Receiver<RoomEvent>,
    /// Initial audio autoplay capability reported by the transport
    pub audio_playback_allowed: bool,
}

pub struct RoomManager {
    transport: Arc<dyn RoomTransport>,
    active: Mutex<Option<Arc<dyn RoomHandle>>>,
}

impl RoomManager {
    pub fn new(transport: Arc<dyn RoomTransport>) -> Self {
        Self {
            transport,
            active: Mutex::new(None),
        }
    }

    /// Open a room connection, replacing any prior one first.
    pub async fn connect(
        &self,
        url: &str,
        credential: &str,
        options: &RoomOptions,
    ) -> Result<ConnectedRoom> {
        if self.is_connected().await {
            debug!("replacing existing room connection");
            if let Err(e) = self.disconnect().await {
                warn!(error = %e, "closing previous room connection failed");
            }
        }

        let handle = self
            .transport
            .connect(url, credential, options)
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let events = match handle.take_events().await {
            Some(events) => events,
            None => {
                // Do not leave the freshly opened connection dangling
                if let Err(e) = handle.disconnect().await {
                    warn!(error = %e, "closing connection without event stream failed");
                }
                return Err(TransportError::Connection(
                    "event stream unavailable".to_string(),
                ));
            }
        };
        let audio_playback_allowed = handle.audio_playback_allowed();

        *self.active.lock().await = Some(handle);

        Ok(ConnectedRoom {
            events,
            audio_playback_allowed,
        })
    }

    /// Close the active connection.
    ///
    /// The local reference is cleared before the close call is awaited, so
    /// the manager never retains a handle whose close failed; the wrapped
    /// error is still returned to the caller.
    pub async fn disconnect(&self) -> Result<()> {
        let handle = self.active.lock().await.take();
        match handle {
            Some(handle) => handle
                .disconnect()
                .await
                .map_err(|e| TransportError::Connection(format!("room close failed: {}", e))),
            None => Ok(()),
        }
    }

    /// Ask the transport to start audio playback.
    pub async fn start_audio(&self) -> Result<()> {
        let handle = self.current_handle().await?;
        handle.start_audio().await
    }

    /// Release the playback attachment for a track. A missing connection is
    /// not an error here: teardown paths release tracks after the
    /// connection may already be gone.
    pub async fn release_track(&self, track_id: &str) -> Result<()> {
        let handle = self.active.lock().await.clone();
        match handle {
            Some(handle) => handle.release_track(track_id).await,
            None => Ok(()),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.active.lock().await.is_some()
    }

    async fn current_handle(&self) -> Result<Arc<dyn RoomHandle>> {
        self.active
            .lock()
            .await
            .clone()
            .ok_or(TransportError::NoActiveConnection)
    }
}
