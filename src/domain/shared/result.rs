use super::error::DomainError;

/// Result of a session or domain operation
pub type Result<T> = std::result::Result<T, DomainError>;
