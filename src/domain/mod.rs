//! Domain layer - Session state model
//!
//! This layer contains:
//! - Participants and the call roster
//! - The replicated meeting document and recording ownership
//! - Broadcast messages and the bounded transcript
//! - Recording overlay layouts

pub mod meeting;
pub mod message;
pub mod overlay;
pub mod participant;
pub mod shared;
pub mod transcript;

// Re-export commonly used types
pub use shared::{DomainError, Result};
