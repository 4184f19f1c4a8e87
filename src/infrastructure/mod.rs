//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - The real-time transport seam and an in-process room implementation
//! - Renderer implementations (tracing output, in-memory recording)

pub mod renderer;
pub mod transport;
