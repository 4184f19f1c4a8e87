//! Shared kernel - Common types used across the session core

pub mod error;
pub mod events;
pub mod result;
pub mod value_objects;

pub use error::DomainError;
pub use events::{CallEvent, CallEventKind};
pub use result::Result;
pub use value_objects::*;
