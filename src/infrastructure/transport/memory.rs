/// In-process transport used by the demo binary and tests
///
/// A `MemoryRoom` plays the part of the hosted call: it holds the replicated
/// meeting document, the per-participant user data and the recording flag, and
/// fans events out to every connected `MemoryTransport`.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{CallTransport, TransportError};
use crate::domain::meeting::{MeetingDocument, RecordingOwnership};
use crate::domain::message::AppMessage;
use crate::domain::overlay::RecordingLayout;
use crate::domain::participant::{MediaState, Participant};
use crate::domain::shared::{CallEvent, ParticipantId, Recipient};

/// Channel on which a connected peer receives call events
pub type EventSender = mpsc::UnboundedSender<CallEvent>;

/// Command issued through a `MemoryTransport`
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    Join { url: String },
    Leave,
    AppMessage { message: AppMessage, to: String },
    SetMeetingState(MeetingDocument),
    SetUserData(RecordingOwnership),
    StartRecording(RecordingLayout),
    StopRecording,
    UpdateRecording(RecordingLayout),
    SetLocalAudio(bool),
    SetLocalVideo(bool),
}

/// Command plus the (tokio) time it was issued
#[derive(Debug, Clone)]
pub struct RecordedCommand {
    pub command: TransportCommand,
    pub at: Instant,
}

struct Peer {
    participant: Participant,
    events: Option<EventSender>,
    user_data: RecordingOwnership,
}

fn send_event(tx: &EventSender, to: &ParticipantId, event: CallEvent) {
    if tx.send(event).is_err() {
        debug!("Event receiver for {} dropped", to);
    }
}

/// `participant` as seen by `viewer`; `is_local` is relative to the receiver
fn seen_by(participant: &Participant, viewer: &ParticipantId) -> Participant {
    let mut participant = participant.clone();
    participant.is_local = participant.id == *viewer;
    participant
}

/// Shared state of one call
pub struct MemoryRoom {
    url: String,
    document: RwLock<MeetingDocument>,
    peers: RwLock<HashMap<ParticipantId, Peer>>,
    recording: RwLock<bool>,
}

impl MemoryRoom {
    pub fn new(url: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            url: url.into(),
            document: RwLock::new(MeetingDocument::default()),
            peers: RwLock::new(HashMap::new()),
            recording: RwLock::new(false),
        })
    }

    pub async fn document(&self) -> MeetingDocument {
        *self.document.read().await
    }

    /// Whether a physical recording is running
    pub async fn is_recording(&self) -> bool {
        *self.recording.read().await
    }

    pub async fn user_data(&self, id: &ParticipantId) -> Option<RecordingOwnership> {
        self.peers.read().await.get(id).map(|p| p.user_data)
    }

    pub async fn participant_ids(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<_> = self.peers.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Deliver an event to every peer accepted by `filter`
    async fn deliver<F>(&self, filter: F, event: impl Fn(&ParticipantId) -> CallEvent)
    where
        F: Fn(&ParticipantId) -> bool,
    {
        let peers = self.peers.read().await;
        for (id, peer) in peers.iter().filter(|(id, _)| filter(id)) {
            if let Some(tx) = &peer.events {
                send_event(tx, id, event(id));
            }
        }
    }
}

/// One participant's connection to a `MemoryRoom`
pub struct MemoryTransport {
    room: Arc<MemoryRoom>,
    local_id: ParticipantId,
    events: Option<EventSender>,
    log: RwLock<Vec<RecordedCommand>>,
    fail_overlay_updates: AtomicBool,
}

impl MemoryTransport {
    pub fn new(room: Arc<MemoryRoom>, local_id: ParticipantId) -> Self {
        Self {
            room,
            local_id,
            events: None,
            log: RwLock::new(Vec::new()),
            fail_overlay_updates: AtomicBool::new(false),
        }
    }

    /// Transport on a private room, for single-participant use
    pub fn standalone() -> Self {
        Self::new(MemoryRoom::new("memory://standalone"), ParticipantId::new())
    }

    /// Receive call events on `events` once joined
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn local_id(&self) -> &ParticipantId {
        &self.local_id
    }

    pub fn room(&self) -> &Arc<MemoryRoom> {
        &self.room
    }

    /// Make subsequent overlay updates fail, as if the recording service were down
    pub fn set_fail_overlay_updates(&self, fail: bool) {
        self.fail_overlay_updates.store(fail, Ordering::SeqCst);
    }

    pub async fn commands(&self) -> Vec<RecordedCommand> {
        self.log.read().await.clone()
    }

    /// Overlay layouts pushed to the recording, in order
    pub async fn overlay_updates(&self) -> Vec<RecordedCommand> {
        self.log
            .read()
            .await
            .iter()
            .filter(|c| matches!(c.command, TransportCommand::UpdateRecording(_)))
            .cloned()
            .collect()
    }

    pub async fn count(&self, predicate: impl Fn(&TransportCommand) -> bool) -> usize {
        self.log
            .read()
            .await
            .iter()
            .filter(|c| predicate(&c.command))
            .count()
    }

    async fn record(&self, command: TransportCommand) {
        self.log.write().await.push(RecordedCommand {
            command,
            at: Instant::now(),
        });
    }

    async fn ensure_joined(&self) -> Result<(), TransportError> {
        if self.room.peers.read().await.contains_key(&self.local_id) {
            Ok(())
        } else {
            Err(TransportError::NotConnected(self.local_id.to_string()))
        }
    }

    async fn set_local_media(
        &self,
        enabled: bool,
        apply: impl Fn(&mut Participant, MediaState),
    ) -> Result<(), TransportError> {
        let state = if enabled { MediaState::Playable } else { MediaState::Off };
        let updated = {
            let mut peers = self.room.peers.write().await;
            let peer = peers
                .get_mut(&self.local_id)
                .ok_or_else(|| TransportError::NotConnected(self.local_id.to_string()))?;
            apply(&mut peer.participant, state);
            peer.participant.clone()
        };

        self.room
            .deliver(
                |_| true,
                |viewer| CallEvent::ParticipantUpdated {
                    participant: seen_by(&updated, viewer),
                },
            )
            .await;
        Ok(())
    }
}

#[async_trait]
impl CallTransport for MemoryTransport {
    async fn join(&self, url: &str, user_name: Option<String>) -> Result<(), TransportError> {
        self.record(TransportCommand::Join {
            url: url.to_string(),
        })
        .await;

        if url != self.room.url {
            warn!("Join rejected: unknown room {}", url);
            return Err(TransportError::JoinRejected(format!("no such room: {}", url)));
        }

        let participant = Participant::local(self.local_id.clone(), user_name)
            .with_media(MediaState::Playable, MediaState::Playable);

        {
            let mut peers = self.room.peers.write().await;
            if peers.contains_key(&self.local_id) {
                return Err(TransportError::JoinRejected(format!(
                    "{} already joined",
                    self.local_id
                )));
            }
            peers.insert(
                self.local_id.clone(),
                Peer {
                    participant: participant.clone(),
                    events: self.events.clone(),
                    user_data: RecordingOwnership::default(),
                },
            );
        }

        if let Some(tx) = &self.events {
            send_event(
                tx,
                &self.local_id,
                CallEvent::JoinedMeeting {
                    local: participant.clone(),
                },
            );
            let peers = self.room.peers.read().await;
            for (id, peer) in peers.iter().filter(|(id, _)| **id != self.local_id) {
                send_event(
                    tx,
                    &self.local_id,
                    CallEvent::ParticipantJoined {
                        participant: seen_by(&peer.participant, &self.local_id),
                    },
                );
                debug!("Announced existing peer {} to {}", id, self.local_id);
            }
        }

        let joined = self.local_id.clone();
        self.room
            .deliver(
                |id| *id != joined,
                |viewer| CallEvent::ParticipantJoined {
                    participant: seen_by(&participant, viewer),
                },
            )
            .await;

        info!("{} joined {}", self.local_id, self.room.url);
        Ok(())
    }

    async fn leave(&self) -> Result<(), TransportError> {
        self.record(TransportCommand::Leave).await;
        self.ensure_joined().await?;

        let left = self.room.peers.write().await.remove(&self.local_id);
        if let Some(tx) = left.and_then(|peer| peer.events) {
            send_event(&tx, &self.local_id, CallEvent::LeftMeeting);
        }

        let left_id = self.local_id.clone();
        self.room
            .deliver(
                |_| true,
                |_| CallEvent::ParticipantLeft {
                    participant_id: left_id.clone(),
                },
            )
            .await;

        info!("{} left {}", self.local_id, self.room.url);
        Ok(())
    }

    async fn send_app_message(
        &self,
        message: &AppMessage,
        to: &Recipient,
    ) -> Result<(), TransportError> {
        self.record(TransportCommand::AppMessage {
            message: message.clone(),
            to: to.as_str().to_string(),
        })
        .await;
        self.ensure_joined().await?;

        let from = self.local_id.clone();
        let data = message.to_value();
        self.room
            .deliver(
                |id| {
                    *id != from
                        && match to {
                            Recipient::All => true,
                            Recipient::Participant(target) => id == target,
                        }
                },
                |_| CallEvent::AppMessage {
                    from_id: from.clone(),
                    data: data.clone(),
                },
            )
            .await;
        Ok(())
    }

    async fn meeting_state(&self) -> Result<MeetingDocument, TransportError> {
        Ok(self.room.document().await)
    }

    async fn set_meeting_state(&self, document: MeetingDocument) -> Result<(), TransportError> {
        self.record(TransportCommand::SetMeetingState(document)).await;
        *self.room.document.write().await = document;
        debug!("Meeting document set to {:?}", document);
        Ok(())
    }

    async fn set_user_data(&self, data: RecordingOwnership) -> Result<(), TransportError> {
        self.record(TransportCommand::SetUserData(data)).await;
        let mut peers = self.room.peers.write().await;
        let peer = peers
            .get_mut(&self.local_id)
            .ok_or_else(|| TransportError::NotConnected(self.local_id.to_string()))?;
        peer.user_data = data;
        Ok(())
    }

    async fn start_recording(&self, layout: &RecordingLayout) -> Result<(), TransportError> {
        self.record(TransportCommand::StartRecording(layout.clone()))
            .await;
        {
            let mut recording = self.room.recording.write().await;
            if *recording {
                return Err(TransportError::Recording("recording already running".to_string()));
            }
            *recording = true;
        }

        self.room
            .deliver(|_| true, |_| CallEvent::RecordingStarted)
            .await;
        Ok(())
    }

    async fn stop_recording(&self) -> Result<(), TransportError> {
        self.record(TransportCommand::StopRecording).await;
        {
            let mut recording = self.room.recording.write().await;
            if !*recording {
                return Err(TransportError::Recording("no recording running".to_string()));
            }
            *recording = false;
        }

        self.room
            .deliver(|_| true, |_| CallEvent::RecordingStopped)
            .await;
        Ok(())
    }

    async fn update_recording(&self, layout: &RecordingLayout) -> Result<(), TransportError> {
        self.record(TransportCommand::UpdateRecording(layout.clone()))
            .await;
        if self.fail_overlay_updates.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed(
                "recording service unavailable".to_string(),
            ));
        }
        Ok(())
    }

    async fn set_local_audio(&self, enabled: bool) -> Result<(), TransportError> {
        self.record(TransportCommand::SetLocalAudio(enabled)).await;
        self.set_local_media(enabled, |p, state| p.audio = state).await
    }

    async fn set_local_video(&self, enabled: bool) -> Result<(), TransportError> {
        self.record(TransportCommand::SetLocalVideo(enabled)).await;
        self.set_local_media(enabled, |p, state| p.video = state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn connect(room: &Arc<MemoryRoom>, id: &str) -> (MemoryTransport, mpsc::UnboundedReceiver<CallEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MemoryTransport::new(room.clone(), id.into()).with_events(tx), rx)
    }

    #[tokio::test]
    async fn test_join_announces_both_ways() {
        let room = MemoryRoom::new("memory://room");
        let (alice, mut alice_rx) = connect(&room, "alice");
        let (bob, mut bob_rx) = connect(&room, "bob");

        alice.join("memory://room", Some("Alice".to_string())).await.unwrap();
        bob.join("memory://room", Some("Bob".to_string())).await.unwrap();

        match alice_rx.recv().await.unwrap() {
            CallEvent::JoinedMeeting { local } => assert!(local.is_local),
            other => panic!("unexpected event {other:?}"),
        }
        match alice_rx.recv().await.unwrap() {
            CallEvent::ParticipantJoined { participant } => {
                assert_eq!(participant.display_name(), "Bob");
                assert!(!participant.is_local);
            }
            other => panic!("unexpected event {other:?}"),
        }

        assert!(matches!(bob_rx.recv().await, Some(CallEvent::JoinedMeeting { .. })));
        match bob_rx.recv().await.unwrap() {
            CallEvent::ParticipantJoined { participant } => {
                assert_eq!(participant.id, ParticipantId::from("alice"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_wrong_room_rejected() {
        let room = MemoryRoom::new("memory://room");
        let (alice, _rx) = connect(&room, "alice");

        let err = alice.join("memory://elsewhere", None).await.unwrap_err();
        assert!(matches!(err, TransportError::JoinRejected(_)));
        assert!(room.participant_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_app_message_skips_sender() {
        let room = MemoryRoom::new("memory://room");
        let (alice, mut alice_rx) = connect(&room, "alice");
        let (bob, mut bob_rx) = connect(&room, "bob");
        alice.join("memory://room", None).await.unwrap();
        bob.join("memory://room", None).await.unwrap();
        while alice_rx.try_recv().is_ok() {}
        while bob_rx.try_recv().is_ok() {}

        alice
            .send_app_message(&AppMessage::chat("hi"), &Recipient::All)
            .await
            .unwrap();

        match bob_rx.try_recv().unwrap() {
            CallEvent::AppMessage { from_id, data } => {
                assert_eq!(from_id, ParticipantId::from("alice"));
                assert_eq!(data["msg"], "hi");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_survives_dropped_receiver() {
        let room = MemoryRoom::new("memory://room");
        let (alice, alice_rx) = connect(&room, "alice");
        let (bob, _bob_rx) = connect(&room, "bob");
        bob.join("memory://room", None).await.unwrap();
        drop(alice_rx);

        assert_ok!(alice.join("memory://room", None).await);
        assert_ok!(alice.leave().await);
        assert_eq!(room.participant_ids().await, vec![ParticipantId::from("bob")]);
    }

    #[tokio::test]
    async fn test_send_before_join_fails() {
        let transport = MemoryTransport::standalone();
        let err = assert_err!(
            transport
                .send_app_message(&AppMessage::emoji("👍"), &Recipient::All)
                .await
        );
        assert!(matches!(err, TransportError::NotConnected(_)));
    }

    #[tokio::test]
    async fn test_recording_lifecycle_reaches_everyone() {
        let room = MemoryRoom::new("memory://room");
        let (alice, mut alice_rx) = connect(&room, "alice");
        let (bob, mut bob_rx) = connect(&room, "bob");
        alice.join("memory://room", None).await.unwrap();
        bob.join("memory://room", None).await.unwrap();
        while alice_rx.try_recv().is_ok() {}
        while bob_rx.try_recv().is_ok() {}

        alice
            .start_recording(&RecordingLayout::with_reaction_assets("custom", "http://a"))
            .await
            .unwrap();
        assert!(room.is_recording().await);
        assert_eq!(alice_rx.try_recv().unwrap(), CallEvent::RecordingStarted);
        assert_eq!(bob_rx.try_recv().unwrap(), CallEvent::RecordingStarted);

        // Second start is refused by the service
        assert!(bob
            .start_recording(&RecordingLayout::with_reaction_assets("custom", "http://a"))
            .await
            .is_err());

        bob.stop_recording().await.unwrap();
        assert!(!room.is_recording().await);
        assert_eq!(alice_rx.try_recv().unwrap(), CallEvent::RecordingStopped);
    }

    #[tokio::test]
    async fn test_local_media_toggle_updates_everyone() {
        let room = MemoryRoom::new("memory://room");
        let (alice, mut alice_rx) = connect(&room, "alice");
        alice.join("memory://room", None).await.unwrap();
        while alice_rx.try_recv().is_ok() {}

        assert_ok!(alice.set_local_audio(false).await);
        match alice_rx.try_recv().unwrap() {
            CallEvent::ParticipantUpdated { participant } => {
                assert!(participant.is_local);
                assert_eq!(participant.audio, MediaState::Off);
                assert_eq!(participant.video, MediaState::Playable);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failing_overlay_updates_are_still_logged() {
        let transport = MemoryTransport::standalone();
        transport.set_fail_overlay_updates(true);

        let result = transport
            .update_recording(&RecordingLayout::clear_reaction("custom"))
            .await;
        assert!(matches!(result, Err(TransportError::SendFailed(_))));
        assert_eq!(transport.overlay_updates().await.len(), 1);
    }
}
