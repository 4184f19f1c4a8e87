/// Renderer that reports UI updates through `tracing`
///
/// Used by the headless demo binary in place of a real UI.
use rand::Rng;
use tracing::{debug, info};

use super::Renderer;
use crate::domain::meeting::RecordControl;
use crate::domain::participant::{Participant, PlayableTracks};
use crate::domain::shared::ParticipantId;

#[derive(Debug, Default)]
pub struct TracingRenderer;

impl TracingRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for TracingRenderer {
    fn add_participant(&self, participant: &Participant) {
        info!(
            "[ui] tile added for {} ({})",
            participant.display_name(),
            participant.id
        );
    }

    fn remove_participant(&self, id: &ParticipantId) {
        info!("[ui] tile removed for {}", id);
    }

    fn remove_all_participants(&self) {
        info!("[ui] all tiles removed");
    }

    fn update_participant_media(&self, participant: &Participant, tracks: PlayableTracks) {
        debug!(
            "[ui] media for {}: video={} audio={}",
            participant.id, tracks.video, tracks.audio
        );
    }

    fn set_controls_enabled(&self, enabled: bool) {
        debug!("[ui] call controls enabled={}", enabled);
    }

    fn set_record_button(&self, control: RecordControl) {
        info!(
            "[ui] record button \"{}\" enabled={}",
            control.label(),
            control.is_enabled()
        );
    }

    fn update_media_labels(&self, mic_on: bool, camera_on: bool) {
        let mic = if mic_on { "Disable Mic" } else { "Enable Mic" };
        let cam = if camera_on { "Disable Cam" } else { "Enable Cam" };
        debug!("[ui] labels: {} / {}", mic, cam);
    }

    fn append_chat_line(&self, name: &str, message: &str) {
        info!("[ui] {}: {}", name, message);
    }

    fn clear_chat(&self) {
        debug!("[ui] chat cleared");
    }

    fn show_reaction(&self, emoji: &str) {
        // Varied size and opacity so bursts of the same reaction stay distinct
        let mut rng = rand::thread_rng();
        let opacity = rng.gen_range(5..=10) as f32 / 10.0;
        let size_em = rng.gen_range(20..=50) as f32 / 10.0;
        info!("[ui] reaction {} (opacity {:.1}, {:.1}em)", emoji, opacity, size_em);
    }

    fn show_call_view(&self, in_call: bool) {
        info!("[ui] showing {}", if in_call { "call" } else { "lobby" });
    }

    fn set_join_enabled(&self, enabled: bool) {
        debug!("[ui] join enabled={}", enabled);
    }
}
