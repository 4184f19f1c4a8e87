use anyhow::Context;
use callstage::application::{EventDispatcher, SessionCommand, SessionCoordinator};
use callstage::config::Config;
use callstage::domain::shared::ParticipantId;
use callstage::infrastructure::renderer::TracingRenderer;
use callstage::infrastructure::transport::{MemoryRoom, MemoryTransport};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;

const ROOM_URL: &str = "memory://demo-room";

/// One simulated participant: command channel plus its dispatcher task
struct Peer {
    commands: mpsc::UnboundedSender<SessionCommand>,
    session: Arc<Mutex<SessionCoordinator>>,
    task: JoinHandle<()>,
}

fn spawn_peer(room: &Arc<MemoryRoom>, config: &Config) -> Peer {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let transport = Arc::new(MemoryTransport::new(room.clone(), ParticipantId::new()).with_events(event_tx));
    let session = Arc::new(Mutex::new(SessionCoordinator::new(
        transport,
        Arc::new(TracingRenderer::new()),
        config,
    )));

    let dispatcher = EventDispatcher::with_default_handlers(session.clone());
    let task = tokio::spawn(async move {
        dispatcher.run(event_rx, command_rx).await;
    });

    Peer {
        commands: command_tx,
        session,
        task,
    }
}

async fn step(peer: &Peer, command: SessionCommand) -> anyhow::Result<()> {
    peer.commands
        .send(command)
        .context("dispatcher stopped")?;
    // Let the room deliver the resulting events
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("failed to load configuration")?;

    // RUST_LOG takes precedence over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Callstage demo");
    info!("Configuration loaded: {:?}", config);

    let room = MemoryRoom::new(ROOM_URL);
    let alice = spawn_peer(&room, &config);
    let bob = spawn_peer(&room, &config);

    let join = |name: &str| SessionCommand::Join {
        url: ROOM_URL.to_string(),
        user_name: Some(name.to_string()),
    };
    step(&alice, join("Alice")).await?;
    step(&bob, join("Bob")).await?;

    step(&alice, SessionCommand::ToggleRecording).await?;
    step(&bob, SessionCommand::SendChat("hi".to_string())).await?;
    step(&alice, SessionCommand::SendChat("hello Bob".to_string())).await?;
    step(&bob, SessionCommand::SendReaction("👍".to_string())).await?;
    step(&alice, SessionCommand::SendReaction("❤️".to_string())).await?;

    // Reaction overlay is cleared once the burst settles
    tokio::time::sleep(config.session.reaction_clear_delay() + Duration::from_millis(100)).await;

    {
        let session = alice.session.lock().await;
        info!(
            "Alice owns the recording: {}, transcript: {:?}",
            session.is_recording_owner(),
            session.transcript().lines()
        );
    }

    step(&bob, SessionCommand::ToggleMicrophone).await?;
    step(&alice, SessionCommand::ToggleRecording).await?;
    info!("Meeting document: {:?}", room.document().await);

    step(&bob, SessionCommand::Leave).await?;
    step(&alice, SessionCommand::Leave).await?;

    // Transports keep their event channels open, so stop the dispatchers here
    for peer in [alice, bob] {
        peer.task.abort();
    }

    info!("Callstage demo finished");
    Ok(())
}
