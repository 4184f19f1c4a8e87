/// Replicated meeting state and recording control
use serde::{Deserialize, Serialize};

/// Shared meeting document replicated by the transport (last write wins)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDocument {
    #[serde(default)]
    pub is_recording: bool,
}

impl MeetingDocument {
    pub fn recording(is_recording: bool) -> Self {
        Self { is_recording }
    }
}

/// Per-participant user data replicated alongside the meeting document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingOwnership {
    #[serde(default)]
    pub is_recording_owner: bool,
}

impl RecordingOwnership {
    pub fn owner(is_recording_owner: bool) -> Self {
        Self { is_recording_owner }
    }
}

/// Record button affordance.
///
/// Only `recording-started` / `recording-stopped` notifications move the
/// control into `Active` or back to `Idle`; a click merely disables it until
/// the authoritative event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordControl {
    #[default]
    Idle,
    Starting,
    Active { is_owner: bool },
    Stopping,
}

impl RecordControl {
    pub fn label(&self) -> &'static str {
        match self {
            RecordControl::Idle | RecordControl::Starting => "Start Recording",
            RecordControl::Active { .. } | RecordControl::Stopping => "Stop Recording",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            RecordControl::Idle => true,
            RecordControl::Active { is_owner } => *is_owner,
            RecordControl::Starting | RecordControl::Stopping => false,
        }
    }

    /// A click is waiting for the transport to confirm
    pub fn is_pending(&self) -> bool {
        matches!(self, RecordControl::Starting | RecordControl::Stopping)
    }

    /// Local click: disable until the transport confirms
    pub fn clicked(self) -> Self {
        match self {
            RecordControl::Idle => RecordControl::Starting,
            RecordControl::Active { .. } => RecordControl::Stopping,
            pending => pending,
        }
    }

    pub fn recording_started(self, is_owner: bool) -> Self {
        RecordControl::Active { is_owner }
    }

    pub fn recording_stopped(self) -> Self {
        RecordControl::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_wire_shape() {
        assert_eq!(
            serde_json::to_value(MeetingDocument::recording(true)).unwrap(),
            json!({ "isRecording": true })
        );
        assert_eq!(
            serde_json::to_value(RecordingOwnership::owner(false)).unwrap(),
            json!({ "isRecordingOwner": false })
        );

        // Missing flag reads as not recording
        let doc: MeetingDocument = serde_json::from_value(json!({})).unwrap();
        assert!(!doc.is_recording);
    }

    #[test]
    fn test_owner_lifecycle() {
        let control = RecordControl::default();
        assert!(control.is_enabled());
        assert_eq!(control.label(), "Start Recording");

        let control = control.clicked();
        assert_eq!(control, RecordControl::Starting);
        assert!(!control.is_enabled());

        let control = control.recording_started(true);
        assert!(control.is_enabled());
        assert_eq!(control.label(), "Stop Recording");

        let control = control.clicked();
        assert_eq!(control, RecordControl::Stopping);
        assert!(!control.is_enabled());

        let control = control.recording_stopped();
        assert_eq!(control, RecordControl::Idle);
    }

    #[test]
    fn test_non_owner_sees_disabled_stop() {
        let control = RecordControl::Idle.recording_started(false);
        assert_eq!(control.label(), "Stop Recording");
        assert!(!control.is_enabled());
        assert!(!control.clicked().is_enabled());
    }

    #[test]
    fn test_repeated_click_stays_pending() {
        assert_eq!(RecordControl::Starting.clicked(), RecordControl::Starting);
        assert_eq!(RecordControl::Stopping.clicked(), RecordControl::Stopping);
        assert!(RecordControl::Starting.is_pending());
        assert!(RecordControl::Stopping.is_pending());
        assert!(!RecordControl::Idle.is_pending());
        assert!(!RecordControl::Active { is_owner: true }.is_pending());
    }
}
