//! Real-time transport seam
//!
//! The transport carries broadcast app messages, the replicated meeting
//! document, per-participant user data and recording commands. Every call is
//! fire-and-forget from the session's point of view.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::meeting::{MeetingDocument, RecordingOwnership};
use crate::domain::message::AppMessage;
use crate::domain::overlay::RecordingLayout;
use crate::domain::shared::Recipient;

pub use memory::{MemoryRoom, MemoryTransport, RecordedCommand, TransportCommand};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("Join rejected: {0}")]
    JoinRejected(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Recording error: {0}")]
    Recording(String),
}

/// Operations the session core needs from the call transport
#[async_trait]
pub trait CallTransport: Send + Sync {
    /// Join the room at `url`
    async fn join(&self, url: &str, user_name: Option<String>) -> Result<(), TransportError>;

    /// Leave the current room
    async fn leave(&self) -> Result<(), TransportError>;

    /// Broadcast an app message
    async fn send_app_message(
        &self,
        message: &AppMessage,
        to: &Recipient,
    ) -> Result<(), TransportError>;

    /// Current local view of the replicated meeting document
    async fn meeting_state(&self) -> Result<MeetingDocument, TransportError>;

    /// Overwrite the replicated meeting document
    async fn set_meeting_state(&self, document: MeetingDocument) -> Result<(), TransportError>;

    /// Publish the local participant's user data
    async fn set_user_data(&self, data: RecordingOwnership) -> Result<(), TransportError>;

    async fn start_recording(&self, layout: &RecordingLayout) -> Result<(), TransportError>;

    async fn stop_recording(&self) -> Result<(), TransportError>;

    /// Push new overlay parameters to the running recording
    async fn update_recording(&self, layout: &RecordingLayout) -> Result<(), TransportError>;

    async fn set_local_audio(&self, enabled: bool) -> Result<(), TransportError>;

    async fn set_local_video(&self, enabled: bool) -> Result<(), TransportError>;
}
