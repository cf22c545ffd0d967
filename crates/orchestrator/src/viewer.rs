//! The avatar viewer orchestration core.
//!
//! Owns the connection state machine, the session reference, track
//! bookkeeping, and the audio gate. All mutable state lives behind one
//! async mutex; background tasks (room-event loop, reconnect loop) carry
//! the epoch they were spawned under and re-check it before applying
//! anything, so a concurrent `disconnect()` always wins over in-flight
//! work.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use events::{EventBus, EventEnvelope, ViewerEvent};
use presence::{AvatarSessionProvider, CreateSessionRequest, SessionProvisioner};
use transport::{
    ConnectedRoom, RoomEvent, RoomManager, RoomOptions, RoomTransport, TransportError,
};
use viewer_core::{
    AudioGate, ConnectionPhase, ConnectionState, Session, TrackHandle, ViewerSnapshot,
};

use crate::error::{Result, ViewerError};
use crate::reconnect::ReconnectPolicy;
use crate::state_machine::ConnectionStateMachine;
use crate::tracks::TrackRegistry;

/// Configuration for one viewer instance.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Avatar to provision a session for
    pub avatar_id: String,
    /// Room the avatar will publish into (hint passed to the provider)
    pub room_url: String,
    /// Credential granting the avatar access to the room
    pub room_credential: String,
    /// Options used when this viewer joins the room
    pub room_options: RoomOptions,
    pub reconnect: ReconnectPolicy,
}

impl ViewerConfig {
    pub fn new(
        avatar_id: impl Into<String>,
        room_url: impl Into<String>,
        room_credential: impl Into<String>,
    ) -> Self {
        Self {
            avatar_id: avatar_id.into(),
            room_url: room_url.into(),
            room_credential: room_credential.into(),
            room_options: RoomOptions::default(),
            reconnect: ReconnectPolicy::default(),
        }
    }

    fn session_request(&self) -> CreateSessionRequest {
        CreateSessionRequest::new(&self.avatar_id, &self.room_url, &self.room_credential)
    }
}

#[derive(Default)]
struct ViewerState {
    /// Bumped on every connect/disconnect; stale background work is
    /// rejected by comparing against it
    epoch: u64,
    connection: ConnectionState,
    session: Option<Session>,
    tracks: TrackRegistry,
    audio: AudioGate,
    event_task: Option<JoinHandle<()>>,
    reconnect_task: Option<JoinHandle<()>>,
}

struct ViewerInner {
    config: ViewerConfig,
    provisioner: SessionProvisioner,
    rooms: RoomManager,
    bus: EventBus,
    state: Mutex<ViewerState>,
}

/// The orchestration core.
///
/// Cheap to clone; clones share the same state and event bus.
#[derive(Clone)]
pub struct AvatarViewer {
    inner: Arc<ViewerInner>,
}

impl AvatarViewer {
    pub fn new(
        config: ViewerConfig,
        provider: Arc<dyn AvatarSessionProvider>,
        transport: Arc<dyn RoomTransport>,
    ) -> Self {
        Self {
            inner: Arc::new(ViewerInner {
                config,
                provisioner: SessionProvisioner::new(provider),
                rooms: RoomManager::new(transport),
                bus: EventBus::new(),
                state: Mutex::new(ViewerState::default()),
            }),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.inner.bus.subscribe()
    }

    /// Immutable snapshot of the current state for consumers.
    pub async fn snapshot(&self) -> ViewerSnapshot {
        let st = self.inner.state.lock().await;
        ViewerSnapshot {
            connection: st.connection.clone(),
            session: st.session.clone(),
            video_tracks: st.tracks.video().to_vec(),
            audio_tracks: st.tracks.audio().to_vec(),
            audio: st.audio,
        }
    }

    /// Run the full connect sequence: provision an avatar session, join the
    /// room with the session-supplied credentials, derive the audio gate.
    ///
    /// A call while already connecting or connected is a logged no-op. Any
    /// previously established session/connection is fully torn down first.
    /// Failure of either step surfaces to the caller and parks the state
    /// machine in `Failed`; there is no automatic retry of an explicit
    /// connect.
    pub async fn connect(&self) -> Result<()> {
        let (epoch, leftover) = {
            let mut st = self.inner.state.lock().await;
            if matches!(
                st.connection.phase,
                ConnectionPhase::Connecting | ConnectionPhase::Connected
            ) {
                warn!(
                    phase = st.connection.phase.as_str(),
                    "connect ignored: already in progress or connected"
                );
                return Ok(());
            }

            Self::abort_tasks(&mut st);
            st.epoch += 1;
            st.tracks.clear();
            st.audio = AudioGate::default();
            let leftover = st.session.take();

            // A reconnecting core passes through disconnected on its way
            // to a fresh connect
            if st.connection.phase == ConnectionPhase::Reconnecting {
                self.set_phase(&mut st, ConnectionPhase::Disconnected)?;
            }
            self.set_phase(&mut st, ConnectionPhase::Connecting)?;
            (st.epoch, leftover)
        };

        if let Some(session) = leftover {
            self.destroy_session_best_effort(&session).await;
        }
        if let Err(e) = self.inner.rooms.disconnect().await {
            warn!(error = %e, "closing leftover room connection failed");
        }

        info!(avatar_id = %self.inner.config.avatar_id, "connecting");
        self.establish(epoch).await
    }

    /// Tear everything down and return to `Disconnected`.
    ///
    /// Always succeeds: teardown failures are logged and suppressed, and
    /// local state (tracks, session reference, audio gate) is cleared
    /// unconditionally. Pending reconnect timers are cancelled
    /// synchronously before the lock is released.
    pub async fn disconnect(&self) -> Result<()> {
        let (session, dropped) = {
            let mut st = self.inner.state.lock().await;
            st.epoch += 1;
            Self::abort_tasks(&mut st);
            let dropped = st.tracks.clear();
            st.audio = AudioGate::default();
            let session = st.session.take();
            if let Err(e) = self.set_phase(&mut st, ConnectionPhase::Disconnected) {
                warn!(error = %e, "phase reset during disconnect");
            }
            (session, dropped)
        };

        for track in dropped {
            if let Err(e) = self.inner.rooms.release_track(&track.id).await {
                debug!(track_id = %track.id, error = %e, "track release failed during disconnect");
            }
        }
        if let Err(e) = self.inner.rooms.disconnect().await {
            warn!(error = %e, "room close failed during disconnect");
        }
        if let Some(session) = session {
            self.destroy_session_best_effort(&session).await;
        }

        info!("viewer disconnected");
        Ok(())
    }

    /// Ask the transport to start audio playback (after a user gesture).
    ///
    /// Fails with `NoActiveConnection` when nothing is connected. On
    /// success the audio gate opens; on failure the gate and the
    /// connection state are left untouched.
    pub async fn start_audio(&self) -> Result<()> {
        let epoch = {
            let st = self.inner.state.lock().await;
            if !st.connection.phase.is_active() {
                return Err(TransportError::NoActiveConnection.into());
            }
            st.epoch
        };

        self.inner.rooms.start_audio().await?;

        let mut st = self.inner.state.lock().await;
        if st.epoch != epoch {
            debug!("start_audio completed after teardown; gate left unchanged");
            return Ok(());
        }
        st.audio.mark_started();
        self.publish(ViewerEvent::AudioGateChanged {
            can_play_audio: st.audio.can_play_audio,
            audio_playback_blocked: st.audio.audio_playback_blocked,
        });
        info!("audio playback started");
        Ok(())
    }

    // --- connect sequence ---

    async fn establish(&self, epoch: u64) -> Result<()> {
        let request = self.inner.config.session_request();

        let session = match self.inner.provisioner.create_session(&request).await {
            Ok(session) => session,
            Err(e) => return self.fail_connect(epoch, e.into()).await,
        };

        let room = match self
            .inner
            .rooms
            .connect(
                &session.transport_url,
                &session.transport_credential,
                &self.inner.config.room_options,
            )
            .await
        {
            Ok(room) => room,
            Err(e) => {
                self.destroy_session_best_effort(&session).await;
                return self.fail_connect(epoch, e.into()).await;
            }
        };

        self.complete_connection(epoch, Some(session), room).await?;
        Ok(())
    }

    /// Record a connect-sequence failure, unless a disconnect superseded
    /// the attempt in the meantime.
    async fn fail_connect(&self, epoch: u64, error: ViewerError) -> Result<()> {
        let mut st = self.inner.state.lock().await;
        if st.epoch != epoch {
            debug!(error = %error, "connect superseded; discarding failure");
            return Ok(());
        }
        error!(error = %error, "connect failed");
        st.connection.mark_failed(error.to_string());
        self.publish(ViewerEvent::ConnectionStateChanged {
            from: ConnectionPhase::Connecting,
            to: ConnectionPhase::Failed,
            error: st.connection.last_error.clone(),
        });
        Err(error)
    }

    /// Commit an established room connection. Returns false when the
    /// attempt turned out to be stale, in which case everything it
    /// provisioned is torn down again.
    async fn complete_connection(
        &self,
        epoch: u64,
        new_session: Option<Session>,
        room: ConnectedRoom,
    ) -> Result<bool> {
        {
            let mut st = self.inner.state.lock().await;
            let current = st.connection.phase;
            let stale = st.epoch != epoch
                || !matches!(
                    current,
                    ConnectionPhase::Connecting | ConnectionPhase::Reconnecting
                );
            if !stale {
                match new_session {
                    Some(session) => {
                        self.publish(ViewerEvent::SessionCreated {
                            session_id: session.id.clone(),
                            avatar_id: session.avatar_id.clone(),
                        });
                        st.session = Some(session);
                    }
                    None => {
                        // A replacement connection starts with no
                        // subscriptions; drop handles left over from the
                        // dead one (its stream will never unsubscribe them)
                        for track in st.tracks.clear() {
                            debug!(track_id = %track.id, "dropping track from replaced connection");
                            self.publish(ViewerEvent::TrackUnsubscribed { track_id: track.id });
                        }
                    }
                }
                st.audio = AudioGate::from_capability(room.audio_playback_allowed);
                self.publish(ViewerEvent::AudioGateChanged {
                    can_play_audio: st.audio.can_play_audio,
                    audio_playback_blocked: st.audio.audio_playback_blocked,
                });
                self.set_phase(&mut st, ConnectionPhase::Connected)?;
                self.spawn_event_loop(&mut st, room.events, epoch);
                info!("room connected");
                return Ok(true);
            }
        }

        debug!("connect superseded; tearing down fresh connection");
        if let Err(e) = self.inner.rooms.disconnect().await {
            warn!(error = %e, "closing superseded room connection failed");
        }
        if let Some(session) = new_session {
            self.destroy_session_best_effort(&session).await;
        }
        Ok(false)
    }

    // --- room events ---

    fn spawn_event_loop(
        &self,
        st: &mut ViewerState,
        mut rx: mpsc::Receiver<RoomEvent>,
        epoch: u64,
    ) {
        if let Some(task) = st.event_task.take() {
            task.abort();
        }
        let viewer = self.clone();
        st.event_task = Some(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                viewer.handle_room_event(epoch, event).await;
            }
            debug!("room event stream ended");
        }));
    }

    async fn handle_room_event(&self, epoch: u64, event: RoomEvent) {
        let mut st = self.inner.state.lock().await;
        if st.epoch != epoch {
            debug!("room event from a torn-down connection ignored");
            return;
        }

        match event {
            RoomEvent::Connected => debug!("transport reports connected"),

            RoomEvent::Reconnecting => {
                if st.connection.phase == ConnectionPhase::Connected {
                    info!("transport is reconnecting");
                    if let Err(e) = self.set_phase(&mut st, ConnectionPhase::Reconnecting) {
                        warn!(error = %e, "reconnecting transition rejected");
                    }
                }
            }

            RoomEvent::Reconnected => {
                if st.connection.phase == ConnectionPhase::Reconnecting {
                    if let Some(task) = st.reconnect_task.take() {
                        task.abort();
                    }
                    if let Err(e) = self.set_phase(&mut st, ConnectionPhase::Connected) {
                        warn!(error = %e, "reconnected transition rejected");
                    } else {
                        info!("transport reconnected");
                    }
                }
            }

            RoomEvent::Disconnected { reason } => match st.connection.phase {
                ConnectionPhase::Connected => {
                    warn!(reason = %reason, "room connection dropped, scheduling reconnect");
                    st.connection.last_error = Some(reason);
                    if let Err(e) = self.set_phase(&mut st, ConnectionPhase::Reconnecting) {
                        warn!(error = %e, "reconnecting transition rejected");
                        return;
                    }
                    self.spawn_reconnect_loop(&mut st, epoch);
                }
                ConnectionPhase::Reconnecting => {
                    if st.reconnect_task.is_none() {
                        warn!(reason = %reason, "transport gave up reconnecting, taking over");
                        self.spawn_reconnect_loop(&mut st, epoch);
                    }
                }
                _ => debug!(reason = %reason, "disconnect event ignored in current phase"),
            },

            RoomEvent::TrackSubscribed {
                id,
                kind,
                publisher,
            } => {
                let handle = TrackHandle::new(id, kind, publisher);
                if st.tracks.subscribe(handle.clone()) {
                    info!(
                        track_id = %handle.id,
                        kind = handle.kind.as_str(),
                        publisher = %handle.publisher,
                        "track subscribed"
                    );
                    self.publish(ViewerEvent::TrackSubscribed {
                        track_id: handle.id,
                        kind: handle.kind,
                        publisher: handle.publisher,
                    });
                } else {
                    debug!(track_id = %handle.id, "duplicate track subscription ignored");
                }
            }

            RoomEvent::TrackUnsubscribed { id } => {
                if let Some(handle) = st.tracks.unsubscribe(&id) {
                    if let Err(e) = self.inner.rooms.release_track(&handle.id).await {
                        debug!(track_id = %handle.id, error = %e, "track release failed");
                    }
                    info!(track_id = %handle.id, "track unsubscribed");
                    self.publish(ViewerEvent::TrackUnsubscribed { track_id: id });
                }
            }

            RoomEvent::AudioCapabilityChanged { can_play } => {
                st.audio.recompute(can_play);
                debug!(can_play, "audio capability changed");
                self.publish(ViewerEvent::AudioGateChanged {
                    can_play_audio: st.audio.can_play_audio,
                    audio_playback_blocked: st.audio.audio_playback_blocked,
                });
            }

            RoomEvent::MediaError { message } => {
                warn!(error = %message, "media error reported by transport");
                self.publish(ViewerEvent::MediaError { message });
            }
        }
    }

    // --- reconnection ---

    fn spawn_reconnect_loop(&self, st: &mut ViewerState, epoch: u64) {
        if let Some(task) = st.reconnect_task.take() {
            task.abort();
        }
        let viewer = self.clone();
        st.reconnect_task = Some(tokio::spawn(async move {
            viewer.run_reconnect_loop(epoch).await;
        }));
    }

    async fn run_reconnect_loop(&self, epoch: u64) {
        let policy = self.inner.config.reconnect.clone();

        loop {
            let attempt = {
                let mut st = self.inner.state.lock().await;
                if st.epoch != epoch || st.connection.phase != ConnectionPhase::Reconnecting {
                    return;
                }
                st.connection.reconnect_attempts += 1;
                st.connection.reconnect_attempts
            };

            let delay = policy.delay_for(attempt);
            info!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "reconnect attempt scheduled"
            );
            self.publish(ViewerEvent::ReconnectScheduled {
                attempt,
                delay_ms: delay.as_millis() as u64,
            });

            tokio::time::sleep(delay).await;

            // The timer may have outlived a disconnect; never resurrect a
            // torn-down session
            {
                let st = self.inner.state.lock().await;
                if st.epoch != epoch || st.connection.phase != ConnectionPhase::Reconnecting {
                    return;
                }
            }

            match self.try_reconnect(epoch).await {
                Ok(true) => return,
                Ok(false) => return,
                Err(e) => {
                    warn!(attempt, error = %e, "reconnect attempt failed");
                    if attempt >= policy.max_attempts {
                        self.give_up(epoch, e).await;
                        return;
                    }
                }
            }
        }
    }

    /// One reconnect attempt. Reuses the existing session, refreshing it
    /// first only if it expired during the outage. Returns false when the
    /// attempt discovered it was stale.
    async fn try_reconnect(&self, epoch: u64) -> Result<bool> {
        let session = {
            let st = self.inner.state.lock().await;
            if st.epoch != epoch || st.connection.phase != ConnectionPhase::Reconnecting {
                return Ok(false);
            }
            match st.session.clone() {
                Some(session) => session,
                None => return Ok(false),
            }
        };

        let session = if self.inner.provisioner.is_expired(&session) {
            info!(session_id = %session.id, "session expired during outage, refreshing");
            let request = self.inner.config.session_request();
            let refreshed = self
                .inner
                .provisioner
                .refresh_session(&session, &request)
                .await?;
            let stale = {
                let mut st = self.inner.state.lock().await;
                if st.epoch != epoch || st.connection.phase != ConnectionPhase::Reconnecting {
                    true
                } else {
                    st.session = Some(refreshed.clone());
                    false
                }
            };
            if stale {
                self.destroy_session_best_effort(&refreshed).await;
                return Ok(false);
            }
            refreshed
        } else {
            session
        };

        let room = self
            .inner
            .rooms
            .connect(
                &session.transport_url,
                &session.transport_credential,
                &self.inner.config.room_options,
            )
            .await?;

        self.complete_connection(epoch, None, room).await
    }

    /// Reconnect budget exhausted: tear down and park in `Failed`.
    async fn give_up(&self, epoch: u64, last_error: ViewerError) {
        let (session, dropped) = {
            let mut st = self.inner.state.lock().await;
            if st.epoch != epoch || st.connection.phase != ConnectionPhase::Reconnecting {
                return;
            }
            error!(error = %last_error, "reconnect attempts exhausted");
            if let Some(task) = st.event_task.take() {
                task.abort();
            }
            let dropped = st.tracks.clear();
            st.audio = AudioGate::default();
            let session = st.session.take();
            st.connection.mark_failed(last_error.to_string());
            self.publish(ViewerEvent::ConnectionStateChanged {
                from: ConnectionPhase::Reconnecting,
                to: ConnectionPhase::Failed,
                error: st.connection.last_error.clone(),
            });
            (session, dropped)
        };

        for track in dropped {
            if let Err(e) = self.inner.rooms.release_track(&track.id).await {
                debug!(track_id = %track.id, error = %e, "track release failed");
            }
        }
        if let Err(e) = self.inner.rooms.disconnect().await {
            debug!(error = %e, "room close failed after reconnect exhaustion");
        }
        if let Some(session) = session {
            self.destroy_session_best_effort(&session).await;
        }
    }

    // --- helpers ---

    /// Apply a validated phase transition and publish it. `Connected`
    /// resets the attempt counter and error; `Disconnected` resets the
    /// whole connection state.
    fn set_phase(&self, st: &mut ViewerState, to: ConnectionPhase) -> Result<()> {
        let from = st.connection.phase;
        if from == to {
            return Ok(());
        }
        ConnectionStateMachine::validate_transition(&from, &to)?;
        match to {
            ConnectionPhase::Connected => st.connection.mark_connected(),
            ConnectionPhase::Disconnected => st.connection = ConnectionState::default(),
            _ => st.connection.phase = to,
        }
        self.publish(ViewerEvent::ConnectionStateChanged {
            from,
            to,
            error: st.connection.last_error.clone(),
        });
        Ok(())
    }

    fn abort_tasks(st: &mut ViewerState) {
        if let Some(task) = st.event_task.take() {
            task.abort();
        }
        if let Some(task) = st.reconnect_task.take() {
            task.abort();
        }
    }

    async fn destroy_session_best_effort(&self, session: &Session) {
        if let Err(e) = self.inner.provisioner.destroy_session(&session.id).await {
            warn!(session_id = %session.id, error = %e, "session destroy failed (ignored)");
        }
        self.publish(ViewerEvent::SessionDestroyed {
            session_id: session.id.clone(),
        });
    }

    fn publish(&self, event: ViewerEvent) {
        self.inner.bus.publish(EventEnvelope::new(event));
    }
}
