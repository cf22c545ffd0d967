//! Orchestration core.
//!
//! Composes the session provisioner and the room connection manager into
//! the end-to-end connect/disconnect sequence: the connection state
//! machine, the reconnection policy, track bookkeeping, and the audio
//! autoplay gate.

pub mod error;
pub mod reconnect;
pub mod state_machine;
pub mod tracks;
pub mod viewer;

pub use error::{Result, ViewerError};
pub use reconnect::ReconnectPolicy;
pub use state_machine::ConnectionStateMachine;
pub use tracks::TrackRegistry;
pub use viewer::{AvatarViewer, ViewerConfig};
