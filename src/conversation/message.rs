//! Message types

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Opaque message identifier, assigned by the store at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Lifecycle status of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Content is fixed
    Final,
    /// Assistant reply still receiving fragments
    Streaming,
}

/// A single entry in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub status: MessageStatus,
    /// Display only; ordering comes from position in the store
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: String, status: MessageStatus) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content,
            status,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into(), MessageStatus::Final)
    }

    pub(crate) fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text.into(), MessageStatus::Final)
    }

    pub(crate) fn pending_assistant() -> Self {
        Self::new(Role::Assistant, String::new(), MessageStatus::Streaming)
    }

    pub fn is_streaming(&self) -> bool {
        self.status == MessageStatus::Streaming
    }

    /// Creation time as local `HH:MM`
    pub fn display_time(&self) -> String {
        self.created_at
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }
}
