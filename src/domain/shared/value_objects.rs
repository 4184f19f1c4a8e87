//! Shared value objects used across multiple bounded contexts

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Participant session identifier
///
/// Opaque to the core: the transport hands these out and they stay stable
/// for the duration of the call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Broadcast recipient for app messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Fan-out to every participant (`*`)
    All,
    /// A single participant
    Participant(ParticipantId),
}

impl Recipient {
    pub fn as_str(&self) -> &str {
        match self {
            Recipient::All => "*",
            Recipient::Participant(id) => id.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ParticipantId::new(), ParticipantId::new());
    }

    #[test]
    fn test_recipient_wire_value() {
        assert_eq!(Recipient::All.as_str(), "*");
        assert_eq!(Recipient::Participant("p1".into()).as_str(), "p1");
    }
}
