//! Assistant error types

use thiserror::Error;

/// Failure while talking to the remote assistant
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct AssistantError {
    pub kind: AssistantErrorKind,
    pub message: String,
}

impl AssistantError {
    pub fn new(kind: AssistantErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(AssistantErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(AssistantErrorKind::Decode, message)
    }
}

/// Error classification. Both kinds look the same to the user; the split
/// exists for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantErrorKind {
    /// Request not sent, non-success status, missing body, or the
    /// connection dropped mid-stream
    Transport,
    /// Response bytes are not valid UTF-8
    Decode,
}

impl AssistantErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Decode => "decode",
        }
    }
}

impl std::fmt::Display for AssistantErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
