/// Session coordinator
///
/// Owns everything the local participant knows about the call: the roster,
/// the recording ownership flag, the record control and (through the
/// projector) the transcript. All handlers run to completion before the next
/// event is taken, so no locking is needed here.
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::projector::OverlayProjector;
use crate::config::{Config, RecordingConfig};
use crate::domain::meeting::{MeetingDocument, RecordControl, RecordingOwnership};
use crate::domain::message::{AppMessage, TranscriptEntry};
use crate::domain::overlay::RecordingLayout;
use crate::domain::participant::{Participant, Roster, DEFAULT_DISPLAY_NAME};
use crate::domain::shared::{DomainError, ParticipantId, Recipient, Result};
use crate::domain::transcript::Transcript;
use crate::infrastructure::renderer::Renderer;
use crate::infrastructure::transport::{CallTransport, TransportError};

pub struct SessionCoordinator {
    transport: Arc<dyn CallTransport>,
    renderer: Arc<dyn Renderer>,
    projector: OverlayProjector,
    recording: RecordingConfig,
    roster: Roster,
    ownership: RecordingOwnership,
    record_control: RecordControl,
    joined: bool,
}

impl SessionCoordinator {
    pub fn new(
        transport: Arc<dyn CallTransport>,
        renderer: Arc<dyn Renderer>,
        config: &Config,
    ) -> Self {
        Self {
            projector: OverlayProjector::new(transport.clone(), config),
            transport,
            renderer,
            recording: config.recording.clone(),
            roster: Roster::new(),
            ownership: RecordingOwnership::default(),
            record_control: RecordControl::default(),
            joined: false,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn transcript(&self) -> &Transcript {
        self.projector.transcript()
    }

    pub fn projector(&self) -> &OverlayProjector {
        &self.projector
    }

    pub fn is_recording_owner(&self) -> bool {
        self.ownership.is_recording_owner
    }

    pub fn record_control(&self) -> RecordControl {
        self.record_control
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    // ---- join / leave ----

    /// Ask the transport to join `url`.
    ///
    /// A rejected join puts the lobby back with the join control enabled.
    pub async fn join(
        &mut self,
        url: &str,
        user_name: Option<String>,
    ) -> std::result::Result<(), TransportError> {
        // Avoid double-join attempts
        self.renderer.set_join_enabled(false);

        if let Err(e) = self.transport.join(url, user_name).await {
            error!("Failed to join {}: {}", url, e);
            self.show_lobby();
            return Err(e);
        }
        Ok(())
    }

    pub async fn leave(&mut self) -> Result<()> {
        self.ensure_joined()?;
        if let Err(e) = self.transport.leave().await {
            error!("Failed to leave call: {}", e);
        }
        Ok(())
    }

    pub fn on_joined(&mut self, local: Participant) {
        if self.joined {
            warn!("Ignoring duplicate joined notification for {}", local.id);
            return;
        }

        if let Err(e) = self.roster.insert(local.clone()) {
            error!("Cannot register local participant: {}", e);
            return;
        }
        self.joined = true;

        self.renderer.add_participant(&local);
        self.renderer
            .update_participant_media(&local, local.playable_tracks());
        self.renderer.show_call_view(true);
        self.renderer.set_controls_enabled(true);
        self.renderer.set_record_button(self.record_control);

        info!("Joined call as {} ({})", local.display_name(), local.id);
    }

    /// Tear down local state. A running recording is left alone.
    pub fn on_left(&mut self) {
        self.reset_local_state();
        info!("Left call");
    }

    /// Unrecoverable transport error: drop local call state and let the user
    /// try again from the lobby
    pub fn on_error(&mut self, message: &str) {
        error!("An unrecoverable error occurred: {}", message);
        self.reset_local_state();
    }

    pub fn on_nonfatal_error(&mut self, kind: &str, message: &str) {
        warn!("A nonfatal error occurred ({}): {}", kind, message);
    }

    fn reset_local_state(&mut self) {
        self.renderer.set_controls_enabled(false);
        self.renderer.remove_all_participants();
        self.roster.clear();

        self.projector.reset();
        self.renderer.clear_chat();

        self.ownership = RecordingOwnership::default();
        self.record_control = RecordControl::default();
        self.renderer.set_record_button(self.record_control);

        self.joined = false;
        self.show_lobby();
    }

    // ---- roster ----

    pub fn on_participant_joined(&mut self, participant: Participant) {
        let is_new = !self.roster.contains(&participant.id);
        if let Err(e) = self.roster.insert(participant.clone()) {
            warn!("Ignoring participant {}: {}", participant.id, e);
            return;
        }

        if is_new {
            self.renderer.add_participant(&participant);
            info!(
                "Participant {} ({}) joined",
                participant.display_name(),
                participant.id
            );
        } else {
            debug!("Participant {} re-announced", participant.id);
        }
    }

    pub fn on_participant_left(&mut self, id: &ParticipantId) {
        match self.roster.remove(id) {
            Some(participant) => {
                self.renderer.remove_participant(id);
                info!("Participant {} ({}) left", participant.display_name(), id);
            }
            None => debug!("Participant {} already gone", id),
        }
    }

    /// Refresh mic/camera labels when the local participant changes
    pub fn on_participant_updated(&mut self, participant: Participant) {
        if !participant.is_local {
            return;
        }

        self.renderer.update_media_labels(
            participant.audio.is_renderable(),
            participant.video.is_renderable(),
        );
        if let Err(e) = self.roster.insert(participant) {
            warn!("Ignoring local participant update: {}", e);
        }
    }

    pub fn on_track_started(&mut self, participant: Participant) {
        if !self.roster.contains(&participant.id) {
            debug!("Track started for unknown participant {}", participant.id);
            return;
        }

        let tracks = participant.playable_tracks();
        self.renderer.update_participant_media(&participant, tracks);
        if let Err(e) = self.roster.insert(participant) {
            warn!("Ignoring track update: {}", e);
        }
    }

    // ---- chat and reactions ----

    pub async fn send_chat(&mut self, message: &str) -> Result<()> {
        self.ensure_joined()?;

        let name = self
            .roster
            .local()
            .map(Participant::display_name)
            .unwrap_or(DEFAULT_DISPLAY_NAME)
            .to_string();

        if let Err(e) = self
            .transport
            .send_app_message(&AppMessage::chat(message), &Recipient::All)
            .await
        {
            error!("Failed to send chat message: {}", e);
        }

        self.renderer.append_chat_line(&name, message);
        self.projector
            .project(
                self.ownership.is_recording_owner,
                TranscriptEntry::chat(name, message),
            )
            .await;
        Ok(())
    }

    pub async fn on_chat_received(&mut self, sender_id: &ParticipantId, message: &str) {
        let name = self.roster.display_name_of(sender_id).to_string();
        debug!("Chat from {} ({})", name, sender_id);

        self.renderer.append_chat_line(&name, message);
        self.projector
            .project(
                self.ownership.is_recording_owner,
                TranscriptEntry::chat(name, message),
            )
            .await;
    }

    pub async fn send_reaction(&mut self, emoji: &str) -> Result<()> {
        self.ensure_joined()?;

        if let Err(e) = self
            .transport
            .send_app_message(&AppMessage::emoji(emoji), &Recipient::All)
            .await
        {
            error!("Failed to send reaction: {}", e);
        }

        self.renderer.show_reaction(emoji);
        self.projector
            .project(
                self.ownership.is_recording_owner,
                TranscriptEntry::reaction(emoji),
            )
            .await;
        Ok(())
    }

    pub async fn on_reaction_received(&mut self, emoji: &str) {
        self.renderer.show_reaction(emoji);
        self.projector
            .project(
                self.ownership.is_recording_owner,
                TranscriptEntry::reaction(emoji),
            )
            .await;
    }

    /// Decode and route a broadcast payload
    pub async fn on_app_message(&mut self, from_id: &ParticipantId, data: serde_json::Value) {
        match AppMessage::from_value(data) {
            Ok(AppMessage::Chat { msg }) => self.on_chat_received(from_id, &msg).await,
            Ok(AppMessage::Emoji { emoji }) => self.on_reaction_received(&emoji).await,
            Err(e) => warn!("Dropping app message from {}: {}", from_id, e),
        }
    }

    // ---- recording ----

    /// Record button click.
    ///
    /// Only the owner stops the physical recording, but any participant's
    /// click flips the shared flag.
    pub async fn toggle_recording(&mut self) -> Result<()> {
        self.ensure_joined()?;

        if self.record_control.is_pending() {
            debug!("Record control busy ({:?}), ignoring click", self.record_control);
            return Ok(());
        }

        let previous = self.record_control;
        self.set_record_control(previous.clicked());

        let is_recording = match self.transport.meeting_state().await {
            Ok(document) => document.is_recording,
            Err(e) => {
                error!("Cannot read meeting state: {}", e);
                self.set_record_control(previous);
                return Ok(());
            }
        };

        if !is_recording {
            info!("Starting recording");
            let layout = RecordingLayout::with_reaction_assets(
                &self.recording.layout_preset,
                &self.recording.asset_base_url,
            );
            if let Err(e) = self.transport.start_recording(&layout).await {
                error!("Failed to start recording: {}", e);
                self.set_record_control(previous);
                return Ok(());
            }
        } else if self.ownership.is_recording_owner {
            info!("Stopping recording");
            if let Err(e) = self.transport.stop_recording().await {
                error!("Failed to stop recording: {}", e);
                // No recording-stopped event will follow; the flags below say idle
                self.set_record_control(previous.recording_stopped());
            }
        } else {
            info!("Not the recording owner; the recording keeps running");
        }

        self.ownership = RecordingOwnership::owner(!is_recording);
        if let Err(e) = self.transport.set_user_data(self.ownership).await {
            error!("Failed to publish recording ownership: {}", e);
        }
        if let Err(e) = self
            .transport
            .set_meeting_state(MeetingDocument::recording(!is_recording))
            .await
        {
            error!("Failed to update meeting state: {}", e);
        }
        Ok(())
    }

    pub async fn on_recording_started(&mut self) {
        self.write_recording_flag(true).await;

        let is_owner = self.ownership.is_recording_owner;
        info!("Recording started (owner: {})", is_owner);
        self.set_record_control(self.record_control.recording_started(is_owner));
    }

    pub async fn on_recording_stopped(&mut self) {
        self.write_recording_flag(false).await;

        if self.ownership.is_recording_owner {
            self.ownership = RecordingOwnership::owner(false);
            if let Err(e) = self.transport.set_user_data(self.ownership).await {
                error!("Failed to publish recording ownership: {}", e);
            }
        }
        info!("Recording stopped");
        self.set_record_control(self.record_control.recording_stopped());
    }

    // ---- local media ----

    pub async fn toggle_microphone(&mut self) -> Result<()> {
        let mic_on = self.local()?.audio.is_renderable();
        if let Err(e) = self.transport.set_local_audio(!mic_on).await {
            error!("Failed to toggle microphone: {}", e);
        }
        Ok(())
    }

    pub async fn toggle_camera(&mut self) -> Result<()> {
        let camera_on = self.local()?.video.is_renderable();
        if let Err(e) = self.transport.set_local_video(!camera_on).await {
            error!("Failed to toggle camera: {}", e);
        }
        Ok(())
    }

    // ---- helpers ----

    fn ensure_joined(&self) -> Result<()> {
        if self.joined {
            Ok(())
        } else {
            Err(DomainError::InvalidOperation("not in a call".to_string()))
        }
    }

    fn local(&self) -> Result<&Participant> {
        self.ensure_joined()?;
        self.roster
            .local()
            .ok_or_else(|| DomainError::NotFound("local participant".to_string()))
    }

    fn set_record_control(&mut self, control: RecordControl) {
        self.record_control = control;
        self.renderer.set_record_button(control);
    }

    async fn write_recording_flag(&self, is_recording: bool) {
        if let Err(e) = self
            .transport
            .set_meeting_state(MeetingDocument::recording(is_recording))
            .await
        {
            error!("Failed to update meeting state: {}", e);
        }
    }

    fn show_lobby(&self) {
        self.renderer.show_call_view(false);
        self.renderer.set_join_enabled(true);
    }
}
