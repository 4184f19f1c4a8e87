/// Overlay projector
///
/// Turns chat and reaction activity into recording layout updates. Only the
/// recording owner pushes layouts, so there is a single writer per recording.
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::timer::DebounceTimer;
use crate::config::Config;
use crate::domain::message::{Reaction, TranscriptEntry};
use crate::domain::overlay::RecordingLayout;
use crate::domain::transcript::Transcript;
use crate::infrastructure::transport::CallTransport;

pub struct OverlayProjector {
    transport: Arc<dyn CallTransport>,
    transcript: Transcript,
    preset: String,
    reaction_clear_delay: Duration,
    reaction_timer: DebounceTimer,
}

impl OverlayProjector {
    pub fn new(transport: Arc<dyn CallTransport>, config: &Config) -> Self {
        Self {
            transport,
            transcript: Transcript::new(config.session.transcript_capacity()),
            preset: config.recording.layout_preset.clone(),
            reaction_clear_delay: config.session.reaction_clear_delay(),
            reaction_timer: DebounceTimer::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether a reaction overlay is waiting to be cleared
    pub fn reaction_pending(&self) -> bool {
        self.reaction_timer.is_armed()
    }

    /// Record chat activity and, for the recording owner, update the overlay
    pub async fn project(&mut self, is_owner: bool, entry: TranscriptEntry) {
        match entry {
            TranscriptEntry::Chat { received_at, .. } => {
                debug!("Chat line received at {}", received_at.format("%H:%M:%S%.3f"));
                self.project_chat(is_owner, entry).await
            }
            TranscriptEntry::Reaction { emoji, received_at } => {
                debug!("Reaction {} received at {}", emoji, received_at.format("%H:%M:%S%.3f"));
                self.project_reaction(is_owner, &emoji).await
            }
        }
    }

    /// Store a chat line; the owner also shows the updated transcript
    async fn project_chat(&mut self, is_owner: bool, entry: TranscriptEntry) {
        self.transcript.push(entry);

        if !is_owner {
            return;
        }
        let layout = self.chat_layout();
        self.emit(&layout).await;
    }

    /// Text overlay for the current transcript
    pub fn chat_layout(&self) -> RecordingLayout {
        RecordingLayout::chat_text(&self.preset, &self.transcript.lines())
    }

    /// Show a reaction in the recording and (re)arm its clear timer
    async fn project_reaction(&mut self, is_owner: bool, emoji: &str) {
        let Some(reaction) = Reaction::from_emoji(emoji) else {
            warn!("Unrecognized emoji: {}", emoji);
            return;
        };

        if !is_owner {
            return;
        }

        let layout = {
            let mut rng = rand::thread_rng();
            let height_gu = rng.gen_range(2..=5);
            let opacity = rng.gen_range(5..=10) as f32 / 10.0;
            RecordingLayout::reaction_image(&self.preset, reaction, opacity, height_gu)
        };
        self.emit(&layout).await;

        let transport = self.transport.clone();
        let clear = RecordingLayout::clear_reaction(&self.preset);
        self.reaction_timer.arm(self.reaction_clear_delay, async move {
            debug!("Clearing reaction overlay");
            if let Err(e) = transport.update_recording(&clear).await {
                error!("Failed to clear reaction overlay: {}", e);
            }
        });
    }

    /// Drop buffered state and any pending reaction clear
    pub fn reset(&mut self) {
        self.reaction_timer.cancel();
        self.transcript.clear();
    }

    async fn emit(&self, layout: &RecordingLayout) {
        debug!("Updating recording layout");
        if let Err(e) = self.transport.update_recording(layout).await {
            error!("Failed to update recording layout: {}", e);
        }
    }
}
