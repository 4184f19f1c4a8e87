//! Call events delivered by the transport

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value_objects::ParticipantId;
use crate::domain::participant::Participant;

/// Lifecycle and message events raised by the real-time transport.
///
/// Variant names follow the transport's event names (`joined-meeting`,
/// `app-message`, ...), which is also how they appear on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum CallEvent {
    JoinedMeeting { local: Participant },
    LeftMeeting,
    ParticipantJoined { participant: Participant },
    ParticipantUpdated { participant: Participant },
    ParticipantLeft { participant_id: ParticipantId },
    TrackStarted { participant: Participant },
    RecordingStarted,
    RecordingStopped,
    AppMessage {
        from_id: ParticipantId,
        data: serde_json::Value,
    },
    Error { message: String },
    NonfatalError { kind: String, message: String },
}

impl CallEvent {
    pub fn kind(&self) -> CallEventKind {
        match self {
            CallEvent::JoinedMeeting { .. } => CallEventKind::JoinedMeeting,
            CallEvent::LeftMeeting => CallEventKind::LeftMeeting,
            CallEvent::ParticipantJoined { .. } => CallEventKind::ParticipantJoined,
            CallEvent::ParticipantUpdated { .. } => CallEventKind::ParticipantUpdated,
            CallEvent::ParticipantLeft { .. } => CallEventKind::ParticipantLeft,
            CallEvent::TrackStarted { .. } => CallEventKind::TrackStarted,
            CallEvent::RecordingStarted => CallEventKind::RecordingStarted,
            CallEvent::RecordingStopped => CallEventKind::RecordingStopped,
            CallEvent::AppMessage { .. } => CallEventKind::AppMessage,
            CallEvent::Error { .. } => CallEventKind::Error,
            CallEvent::NonfatalError { .. } => CallEventKind::NonfatalError,
        }
    }
}

/// Event name, used as the handler registration key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallEventKind {
    JoinedMeeting,
    LeftMeeting,
    ParticipantJoined,
    ParticipantUpdated,
    ParticipantLeft,
    TrackStarted,
    RecordingStarted,
    RecordingStopped,
    AppMessage,
    Error,
    NonfatalError,
}

impl CallEventKind {
    pub const ALL: [CallEventKind; 11] = [
        CallEventKind::JoinedMeeting,
        CallEventKind::LeftMeeting,
        CallEventKind::ParticipantJoined,
        CallEventKind::ParticipantUpdated,
        CallEventKind::ParticipantLeft,
        CallEventKind::TrackStarted,
        CallEventKind::RecordingStarted,
        CallEventKind::RecordingStopped,
        CallEventKind::AppMessage,
        CallEventKind::Error,
        CallEventKind::NonfatalError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallEventKind::JoinedMeeting => "joined-meeting",
            CallEventKind::LeftMeeting => "left-meeting",
            CallEventKind::ParticipantJoined => "participant-joined",
            CallEventKind::ParticipantUpdated => "participant-updated",
            CallEventKind::ParticipantLeft => "participant-left",
            CallEventKind::TrackStarted => "track-started",
            CallEventKind::RecordingStarted => "recording-started",
            CallEventKind::RecordingStopped => "recording-stopped",
            CallEventKind::AppMessage => "app-message",
            CallEventKind::Error => "error",
            CallEventKind::NonfatalError => "nonfatal-error",
        }
    }
}

impl fmt::Display for CallEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
