/// Participant and roster domain model
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::shared::{DomainError, ParticipantId, Result};

/// Display name used when a participant has not set one
pub const DEFAULT_DISPLAY_NAME: &str = "Guest";

/// Media track state as reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaState {
    /// No track
    #[default]
    #[serde(rename = "none")]
    Off,
    Loading,
    Playable,
}

impl MediaState {
    /// Loading tracks are bound as well so playback starts as soon as data arrives
    pub fn is_renderable(&self) -> bool {
        matches!(self, MediaState::Loading | MediaState::Playable)
    }
}

/// Call participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub audio: MediaState,
    #[serde(default)]
    pub video: MediaState,
}

impl Participant {
    pub fn new(id: ParticipantId, user_name: Option<String>, is_local: bool) -> Self {
        Self {
            id,
            user_name,
            is_local,
            audio: MediaState::Off,
            video: MediaState::Off,
        }
    }

    pub fn local(id: ParticipantId, user_name: Option<String>) -> Self {
        Self::new(id, user_name, true)
    }

    pub fn remote(id: ParticipantId, user_name: Option<String>) -> Self {
        Self::new(id, user_name, false)
    }

    pub fn with_media(mut self, audio: MediaState, video: MediaState) -> Self {
        self.audio = audio;
        self.video = video;
        self
    }

    /// Name shown next to chat lines, falling back to "Guest"
    pub fn display_name(&self) -> &str {
        match self.user_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_DISPLAY_NAME,
        }
    }

    /// Tracks the renderer should attach for this participant.
    ///
    /// Local audio is never played back.
    pub fn playable_tracks(&self) -> PlayableTracks {
        PlayableTracks {
            video: self.video.is_renderable(),
            audio: !self.is_local && self.audio.is_renderable(),
        }
    }
}

/// Tracks eligible for playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayableTracks {
    pub video: bool,
    pub audio: bool,
}

/// Participants currently in the call
#[derive(Debug, Default)]
pub struct Roster {
    participants: HashMap<ParticipantId, Participant>,
    local_id: Option<ParticipantId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a participant.
    ///
    /// Re-inserting an existing id replaces the entry, so the roster never
    /// holds duplicates. A second, different local participant is rejected.
    pub fn insert(&mut self, participant: Participant) -> Result<()> {
        if participant.is_local {
            match &self.local_id {
                Some(local_id) if *local_id != participant.id => {
                    return Err(DomainError::Conflict(format!(
                        "local participant already set to {}",
                        local_id
                    )));
                }
                _ => self.local_id = Some(participant.id.clone()),
            }
        }

        self.participants.insert(participant.id.clone(), participant);
        Ok(())
    }

    /// Remove a participant; absent ids are a no-op
    pub fn remove(&mut self, id: &ParticipantId) -> Option<Participant> {
        let removed = self.participants.remove(id);
        if self.local_id.as_ref() == Some(id) {
            self.local_id = None;
        }
        removed
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn local(&self) -> Option<&Participant> {
        self.local_id.as_ref().and_then(|id| self.participants.get(id))
    }

    /// Display name for `id`, "Guest" if the participant is unknown
    pub fn display_name_of(&self, id: &ParticipantId) -> &str {
        self.get(id)
            .map(Participant::display_name)
            .unwrap_or(DEFAULT_DISPLAY_NAME)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participants.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn ids(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<_> = self.participants.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn clear(&mut self) {
        self.participants.clear();
        self.local_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_display_name_fallback() {
        let named = Participant::remote("a".into(), Some("Alice".to_string()));
        let unnamed = Participant::remote("b".into(), None);
        let blank = Participant::remote("c".into(), Some("  ".to_string()));

        assert_eq!(named.display_name(), "Alice");
        assert_eq!(unnamed.display_name(), "Guest");
        assert_eq!(blank.display_name(), "Guest");
    }

    #[test]
    fn test_local_audio_is_never_playable() {
        let local = Participant::local("me".into(), None)
            .with_media(MediaState::Playable, MediaState::Loading);
        let tracks = local.playable_tracks();
        assert!(tracks.video);
        assert!(!tracks.audio);

        let remote = Participant::remote("you".into(), None)
            .with_media(MediaState::Loading, MediaState::Off);
        let tracks = remote.playable_tracks();
        assert!(!tracks.video);
        assert!(tracks.audio);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut roster = Roster::new();
        roster
            .insert(Participant::remote("a".into(), None))
            .unwrap();

        assert!(roster.remove(&"a".into()).is_some());
        assert!(roster.remove(&"a".into()).is_none());
        assert!(roster.is_empty());
    }

    #[test]
    fn test_rejects_second_local() {
        let mut roster = Roster::new();
        roster.insert(Participant::local("me".into(), None)).unwrap();
        // Same local participant again is an update
        roster
            .insert(Participant::local("me".into(), Some("Me".to_string())))
            .unwrap();
        assert_eq!(roster.local().unwrap().display_name(), "Me");

        let err = roster
            .insert(Participant::local("other".into(), None))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_interleaved_join_leave_matches_model() {
        // Deterministic interleaving with duplicate joins and leaves
        let script: &[(bool, &str)] = &[
            (true, "a"),
            (true, "b"),
            (true, "a"),
            (false, "c"),
            (true, "c"),
            (false, "a"),
            (false, "a"),
            (true, "d"),
            (false, "b"),
            (true, "b"),
        ];

        let mut roster = Roster::new();
        let mut expected: HashSet<&str> = HashSet::new();

        for (join, id) in script {
            if *join {
                roster.insert(Participant::remote((*id).into(), None)).unwrap();
                expected.insert(id);
            } else {
                roster.remove(&(*id).into());
                expected.remove(id);
            }
        }

        let mut expected: Vec<ParticipantId> = expected.into_iter().map(Into::into).collect();
        expected.sort();
        assert_eq!(roster.ids(), expected);
    }

    #[test]
    fn test_unknown_sender_name() {
        let roster = Roster::new();
        assert_eq!(roster.display_name_of(&"ghost".into()), "Guest");
    }
}
