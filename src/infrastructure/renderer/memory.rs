/// Renderer that records every call, for tests and inspection
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Renderer;
use crate::domain::meeting::RecordControl;
use crate::domain::participant::{Participant, PlayableTracks};
use crate::domain::shared::ParticipantId;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    AddParticipant(ParticipantId),
    RemoveParticipant(ParticipantId),
    RemoveAllParticipants,
    UpdateMedia(ParticipantId, PlayableTracks),
    ControlsEnabled(bool),
    RecordButton(RecordControl),
    MediaLabels { mic_on: bool, camera_on: bool },
    ChatLine { name: String, message: String },
    ClearChat,
    Reaction(String),
    CallView(bool),
    JoinEnabled(bool),
}

#[derive(Debug, Default)]
struct RenderState {
    calls: Vec<RenderCall>,
    tiles: BTreeSet<ParticipantId>,
    chat: Vec<String>,
    record_button: RecordControl,
    controls_enabled: bool,
    in_call: bool,
}

#[derive(Debug, Default)]
pub struct MemoryRenderer {
    state: Mutex<RenderState>,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RenderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, call: RenderCall, apply: impl FnOnce(&mut RenderState)) {
        let mut state = self.state();
        apply(&mut state);
        state.calls.push(call);
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.state().calls.clone()
    }

    /// Participant tiles currently shown
    pub fn tiles(&self) -> Vec<ParticipantId> {
        self.state().tiles.iter().cloned().collect()
    }

    /// Chat lines as displayed, "name: message"
    pub fn chat_lines(&self) -> Vec<String> {
        self.state().chat.clone()
    }

    pub fn record_button(&self) -> RecordControl {
        self.state().record_button
    }

    pub fn controls_enabled(&self) -> bool {
        self.state().controls_enabled
    }

    pub fn in_call(&self) -> bool {
        self.state().in_call
    }

    pub fn reactions(&self) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                RenderCall::Reaction(emoji) => Some(emoji.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for MemoryRenderer {
    fn add_participant(&self, participant: &Participant) {
        let id = participant.id.clone();
        self.push(RenderCall::AddParticipant(id.clone()), |s| {
            s.tiles.insert(id);
        });
    }

    fn remove_participant(&self, id: &ParticipantId) {
        self.push(RenderCall::RemoveParticipant(id.clone()), |s| {
            s.tiles.remove(id);
        });
    }

    fn remove_all_participants(&self) {
        self.push(RenderCall::RemoveAllParticipants, |s| s.tiles.clear());
    }

    fn update_participant_media(&self, participant: &Participant, tracks: PlayableTracks) {
        self.push(RenderCall::UpdateMedia(participant.id.clone(), tracks), |_| {});
    }

    fn set_controls_enabled(&self, enabled: bool) {
        self.push(RenderCall::ControlsEnabled(enabled), |s| {
            s.controls_enabled = enabled
        });
    }

    fn set_record_button(&self, control: RecordControl) {
        self.push(RenderCall::RecordButton(control), |s| s.record_button = control);
    }

    fn update_media_labels(&self, mic_on: bool, camera_on: bool) {
        self.push(RenderCall::MediaLabels { mic_on, camera_on }, |_| {});
    }

    fn append_chat_line(&self, name: &str, message: &str) {
        let line = format!("{}: {}", name, message);
        self.push(
            RenderCall::ChatLine {
                name: name.to_string(),
                message: message.to_string(),
            },
            |s| s.chat.push(line),
        );
    }

    fn clear_chat(&self) {
        self.push(RenderCall::ClearChat, |s| s.chat.clear());
    }

    fn show_reaction(&self, emoji: &str) {
        self.push(RenderCall::Reaction(emoji.to_string()), |_| {});
    }

    fn show_call_view(&self, in_call: bool) {
        self.push(RenderCall::CallView(in_call), |s| s.in_call = in_call);
    }

    fn set_join_enabled(&self, enabled: bool) {
        self.push(RenderCall::JoinEnabled(enabled), |_| {});
    }
}
