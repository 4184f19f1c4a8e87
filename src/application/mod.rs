//! Application layer - session use cases
//!
//! The coordinator owns session state, the projector turns it into recording
//! overlays and the dispatcher feeds both from the transport.

pub mod coordinator;
pub mod dispatcher;
pub mod projector;
pub mod timer;

pub use coordinator::SessionCoordinator;
pub use dispatcher::{CallEventHandler, EventDispatcher, SessionCommand, SessionEventHandler};
pub use projector::OverlayProjector;
pub use timer::DebounceTimer;
