//! UI projection of session state
//!
//! Renderers must treat a missing render target as a no-op; the session
//! never checks whether a call reached anything.

pub mod memory;
pub mod tracing_renderer;

use crate::domain::meeting::RecordControl;
use crate::domain::participant::{Participant, PlayableTracks};
use crate::domain::shared::ParticipantId;

pub use memory::{MemoryRenderer, RenderCall};
pub use tracing_renderer::TracingRenderer;

#[cfg_attr(test, mockall::automock)]
pub trait Renderer: Send + Sync {
    fn add_participant(&self, participant: &Participant);

    /// Detach media and drop the participant's tile
    fn remove_participant(&self, id: &ParticipantId);

    /// Detach media for every tile, then drop them all
    fn remove_all_participants(&self);

    fn update_participant_media(&self, participant: &Participant, tracks: PlayableTracks);

    fn set_controls_enabled(&self, enabled: bool);

    fn set_record_button(&self, control: RecordControl);

    /// Mic/camera toggle labels
    fn update_media_labels(&self, mic_on: bool, camera_on: bool);

    fn append_chat_line(&self, name: &str, message: &str);

    fn clear_chat(&self);

    fn show_reaction(&self, emoji: &str);

    /// `true` shows the in-call view, `false` the lobby
    fn show_call_view(&self, in_call: bool);

    fn set_join_enabled(&self, enabled: bool);
}
