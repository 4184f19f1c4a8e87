/// Event dispatcher
///
/// Routes transport events to registered handlers and user commands to the
/// session coordinator. Each event is handled to completion before the next
/// one is taken off the channel.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info};

use super::coordinator::SessionCoordinator;
use crate::domain::shared::{CallEvent, CallEventKind, Result};

/// Handler for one or more kinds of call event
#[async_trait]
pub trait CallEventHandler: Send + Sync {
    async fn handle_event(&self, event: CallEvent) -> Result<()>;

    /// Check if this handler accepts the given event kind
    fn can_handle(&self, kind: CallEventKind) -> bool;
}

/// User action issued from the UI
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Join {
        url: String,
        user_name: Option<String>,
    },
    SendChat(String),
    SendReaction(String),
    ToggleRecording,
    ToggleMicrophone,
    ToggleCamera,
    Leave,
}

/// Forwards every call event to the session coordinator
pub struct SessionEventHandler {
    session: Arc<Mutex<SessionCoordinator>>,
}

impl SessionEventHandler {
    pub fn new(session: Arc<Mutex<SessionCoordinator>>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl CallEventHandler for SessionEventHandler {
    async fn handle_event(&self, event: CallEvent) -> Result<()> {
        let mut session = self.session.lock().await;
        match event {
            CallEvent::JoinedMeeting { local } => session.on_joined(local),
            CallEvent::LeftMeeting => session.on_left(),
            CallEvent::ParticipantJoined { participant } => {
                session.on_participant_joined(participant)
            }
            CallEvent::ParticipantUpdated { participant } => {
                session.on_participant_updated(participant)
            }
            CallEvent::ParticipantLeft { participant_id } => {
                session.on_participant_left(&participant_id)
            }
            CallEvent::TrackStarted { participant } => session.on_track_started(participant),
            CallEvent::RecordingStarted => session.on_recording_started().await,
            CallEvent::RecordingStopped => session.on_recording_stopped().await,
            CallEvent::AppMessage { from_id, data } => {
                session.on_app_message(&from_id, data).await
            }
            CallEvent::Error { message } => session.on_error(&message),
            CallEvent::NonfatalError { kind, message } => {
                session.on_nonfatal_error(&kind, &message)
            }
        }
        Ok(())
    }

    fn can_handle(&self, _kind: CallEventKind) -> bool {
        true
    }
}

pub struct EventDispatcher {
    session: Arc<Mutex<SessionCoordinator>>,
    handlers: HashMap<CallEventKind, Arc<dyn CallEventHandler>>,
}

impl EventDispatcher {
    /// Dispatcher with no handlers registered
    pub fn new(session: Arc<Mutex<SessionCoordinator>>) -> Self {
        Self {
            session,
            handlers: HashMap::new(),
        }
    }

    /// Dispatcher that sends every event kind to the session coordinator
    pub fn with_default_handlers(session: Arc<Mutex<SessionCoordinator>>) -> Self {
        let mut dispatcher = Self::new(session.clone());
        let handler: Arc<dyn CallEventHandler> = Arc::new(SessionEventHandler::new(session));
        for kind in CallEventKind::ALL {
            dispatcher.register_handler(kind, handler.clone());
        }
        dispatcher
    }

    pub fn register_handler(&mut self, kind: CallEventKind, handler: Arc<dyn CallEventHandler>) {
        if !handler.can_handle(kind) {
            error!("Handler refuses event kind {}, not registered", kind);
            return;
        }
        self.handlers.insert(kind, handler);
        debug!("Registered handler for call event: {}", kind);
    }

    pub fn session(&self) -> &Arc<Mutex<SessionCoordinator>> {
        &self.session
    }

    pub async fn dispatch(&self, event: CallEvent) {
        let kind = event.kind();
        let Some(handler) = self.handlers.get(&kind) else {
            debug!("No handler for call event: {}", kind);
            return;
        };

        debug!("Dispatching call event: {}", kind);
        if let Err(e) = handler.handle_event(event).await {
            error!("Error handling {}: {}", kind, e);
        }
    }

    pub async fn execute(&self, command: SessionCommand) {
        debug!("Executing command: {:?}", command);
        let mut session = self.session.lock().await;

        let result = match command {
            SessionCommand::Join { url, user_name } => {
                // Join failures are already reported and recovered by the session
                let _ = session.join(&url, user_name).await;
                Ok(())
            }
            SessionCommand::SendChat(message) => session.send_chat(&message).await,
            SessionCommand::SendReaction(emoji) => session.send_reaction(&emoji).await,
            SessionCommand::ToggleRecording => session.toggle_recording().await,
            SessionCommand::ToggleMicrophone => session.toggle_microphone().await,
            SessionCommand::ToggleCamera => session.toggle_camera().await,
            SessionCommand::Leave => session.leave().await,
        };

        if let Err(e) = result {
            error!("Command rejected: {}", e);
        }
    }

    /// Process events and commands until both channels are closed
    pub async fn run(
        &self,
        mut events: mpsc::UnboundedReceiver<CallEvent>,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) {
        info!("Event dispatcher started");
        loop {
            tokio::select! {
                Some(event) = events.recv() => self.dispatch(event).await,
                Some(command) = commands.recv() => self.execute(command).await,
                else => break,
            }
        }
        info!("Event dispatcher stopped");
    }
}
