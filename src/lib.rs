//! Callstage - session coordinator for recorded group calls
//!
//! Keeps the participant roster, replicates the meeting recording flag and
//! projects chat and reactions onto the recording as overlays.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{EventDispatcher, SessionCommand, SessionCoordinator};
pub use config::Config;
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;
