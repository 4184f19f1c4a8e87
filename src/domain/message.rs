/// Broadcast app messages and transcript entries
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::{DomainError, Result};

/// Message broadcast to the other participants.
///
/// Sender identity travels in the transport envelope, not in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AppMessage {
    Chat { msg: String },
    Emoji { emoji: String },
}

impl AppMessage {
    pub fn chat(msg: impl Into<String>) -> Self {
        AppMessage::Chat { msg: msg.into() }
    }

    pub fn emoji(emoji: impl Into<String>) -> Self {
        AppMessage::Emoji {
            emoji: emoji.into(),
        }
    }

    /// Decode a raw app-message payload.
    ///
    /// Payloads with an unknown `kind` or missing fields are rejected instead
    /// of being guessed at.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let kind = value
            .get("kind")
            .and_then(|k| k.as_str())
            .unwrap_or("<missing>")
            .to_string();

        serde_json::from_value(value)
            .map_err(|e| DomainError::UnsupportedMessage(format!("kind {}: {}", kind, e)))
    }

    pub fn to_value(&self) -> serde_json::Value {
        match self {
            AppMessage::Chat { msg } => serde_json::json!({ "kind": "chat", "msg": msg }),
            AppMessage::Emoji { emoji } => serde_json::json!({ "kind": "emoji", "emoji": emoji }),
        }
    }
}

/// The fixed set of reactions the recording layout has artwork for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reaction {
    Heart,
    ThumbsUp,
    ThumbsDown,
    Boo,
}

impl Reaction {
    pub const ALL: [Reaction; 4] = [
        Reaction::Heart,
        Reaction::ThumbsUp,
        Reaction::ThumbsDown,
        Reaction::Boo,
    ];

    pub fn from_emoji(emoji: &str) -> Option<Self> {
        match emoji {
            "❤️" | "❤" => Some(Reaction::Heart),
            "👍" => Some(Reaction::ThumbsUp),
            "👎" => Some(Reaction::ThumbsDown),
            "🎃" => Some(Reaction::Boo),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Reaction::Heart => "❤️",
            Reaction::ThumbsUp => "👍",
            Reaction::ThumbsDown => "👎",
            Reaction::Boo => "🎃",
        }
    }

    /// Asset name referenced by the image overlay
    pub fn asset_name(&self) -> &'static str {
        match self {
            Reaction::Heart => "heart",
            Reaction::ThumbsUp => "up",
            Reaction::ThumbsDown => "down",
            Reaction::Boo => "boo",
        }
    }

    /// Session asset key registered when the recording starts
    pub fn asset_key(&self) -> String {
        format!("images/{}", self.asset_name())
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.emoji())
    }
}

/// Entry in the local event transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Chat {
        sender_name: String,
        message: String,
        received_at: DateTime<Utc>,
    },
    Reaction {
        emoji: String,
        received_at: DateTime<Utc>,
    },
}

impl TranscriptEntry {
    pub fn chat(sender_name: impl Into<String>, message: impl Into<String>) -> Self {
        TranscriptEntry::Chat {
            sender_name: sender_name.into(),
            message: message.into(),
            received_at: Utc::now(),
        }
    }

    pub fn reaction(emoji: impl Into<String>) -> Self {
        TranscriptEntry::Reaction {
            emoji: emoji.into(),
            received_at: Utc::now(),
        }
    }

    /// Overlay line for chat entries
    pub fn line(&self) -> Option<String> {
        match self {
            TranscriptEntry::Chat {
                sender_name,
                message,
                ..
            } => Some(format!("{}: {}", sender_name, message)),
            TranscriptEntry::Reaction { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_chat_and_emoji() {
        let chat = AppMessage::from_value(json!({ "kind": "chat", "msg": "hi" })).unwrap();
        assert_eq!(chat, AppMessage::chat("hi"));

        let emoji = AppMessage::from_value(json!({ "kind": "emoji", "emoji": "👍" })).unwrap();
        assert_eq!(emoji, AppMessage::emoji("👍"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = AppMessage::from_value(json!({ "kind": "poll", "question": "?" })).unwrap_err();
        match err {
            DomainError::UnsupportedMessage(detail) => assert!(detail.contains("poll")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_chat_missing_field_rejected() {
        assert!(AppMessage::from_value(json!({ "kind": "chat" })).is_err());
        assert!(AppMessage::from_value(json!({ "msg": "no kind" })).is_err());
    }

    #[test]
    fn test_wire_shape() {
        assert_eq!(
            serde_json::to_value(AppMessage::chat("hello")).unwrap(),
            json!({ "kind": "chat", "msg": "hello" })
        );
        assert_eq!(AppMessage::emoji("🎃").to_value(), json!({ "kind": "emoji", "emoji": "🎃" }));
    }

    #[test]
    fn test_reaction_table() {
        for reaction in Reaction::ALL {
            assert_eq!(Reaction::from_emoji(reaction.emoji()), Some(reaction));
        }
        assert_eq!(Reaction::from_emoji("🦀"), None);
        assert_eq!(Reaction::ThumbsUp.asset_key(), "images/up");
        assert_eq!(Reaction::Boo.asset_name(), "boo");
    }

    #[test]
    fn test_transcript_line() {
        assert_eq!(
            TranscriptEntry::chat("Alice", "hi").line().as_deref(),
            Some("Alice: hi")
        );
        assert_eq!(TranscriptEntry::reaction("👍").line(), None);
    }
}
