use serde::{Deserialize, Serialize};

/// Originator of a conversation turn. Only these two roles are ever
/// transmitted to the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    pub fn as_str(self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Speaker::User
    }

    pub fn is_assistant(self) -> bool {
        self == Speaker::Assistant
    }
}

impl AsRef<str> for Speaker {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for Speaker {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Speaker::User),
            "assistant" => Ok(Speaker::Assistant),
            _ => Err(format!("invalid speaker: {value}")),
        }
    }
}

/// One message in the conversation. Immutable once appended to the session
/// history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }
}

/// Severity for app-authored notices rendered in the transcript but never
/// transmitted to the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A rendered transcript entry: a conversation turn, or a notice the app
/// itself posted (status changes, saved-image paths, provider failures).
#[derive(Debug, Clone)]
pub enum TranscriptEntry {
    Turn(Turn),
    Notice { kind: NoticeKind, text: String },
}

impl TranscriptEntry {
    pub fn info(text: impl Into<String>) -> Self {
        TranscriptEntry::Notice {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        TranscriptEntry::Notice {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn as_turn(&self) -> Option<&Turn> {
        match self {
            TranscriptEntry::Turn(turn) => Some(turn),
            TranscriptEntry::Notice { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_round_trips_through_api_strings() {
        assert_eq!(Speaker::try_from("user"), Ok(Speaker::User));
        assert_eq!(Speaker::try_from("assistant"), Ok(Speaker::Assistant));
        assert!(Speaker::try_from("system").is_err());
    }

    #[test]
    fn notices_are_not_turns() {
        let entry = TranscriptEntry::error("boom");
        assert!(entry.as_turn().is_none());

        let entry = TranscriptEntry::Turn(Turn::user("hi"));
        assert_eq!(entry.as_turn().unwrap().speaker, Speaker::User);
    }
}
