//! In-memory conversation store
//!
//! All mutation goes through the methods below. Each one takes the lock,
//! applies the change and publishes a [`StoreEvent`] before releasing it, so
//! subscribers see changes in exactly the order they were made.

use super::message::{Message, MessageId, MessageStatus};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Validation failure: nothing left after trimming
    #[error("Message text is empty")]
    EmptyMessage,
    /// Target is missing or no longer streaming. Indicates a sequencing bug.
    #[error("No streaming message with id {0}")]
    NotFound(MessageId),
    #[error("Message {0} is still streaming")]
    AlreadyStreaming(MessageId),
}

/// Change notification published to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A new message, as stored
    Appended(Message),
    /// Text added to the end of a streaming message
    Fragment { id: MessageId, text: String },
    /// A streaming message became final, with its final content
    Finalized(Message),
}

impl StoreEvent {
    pub fn id(&self) -> MessageId {
        match self {
            StoreEvent::Appended(msg) | StoreEvent::Finalized(msg) => msg.id,
            StoreEvent::Fragment { id, .. } => *id,
        }
    }
}

#[derive(Default)]
struct StoreInner {
    messages: Vec<Message>,
    /// Position of each message in `messages`
    index: HashMap<MessageId, usize>,
    streaming: Option<MessageId>,
}

impl StoreInner {
    fn push(&mut self, message: Message) {
        self.index.insert(message.id, self.messages.len());
        if message.is_streaming() {
            self.streaming = Some(message.id);
        }
        self.messages.push(message);
    }

    fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        let pos = *self.index.get(&id)?;
        self.messages.get_mut(pos)
    }
}

/// Ordered, append-only log of messages for one conversation
pub struct ConversationStore {
    inner: Mutex<StoreInner>,
    events: broadcast::Sender<StoreEvent>,
}

impl ConversationStore {
    /// Create a store seeded with a final assistant greeting
    pub fn new(greeting: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mut inner = StoreInner::default();
        inner.push(Message::assistant(greeting));
        Self {
            inner: Mutex::new(inner),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Owned copy of every message, in display order
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub fn get(&self, id: MessageId) -> Option<Message> {
        let inner = self.lock();
        inner.index.get(&id).map(|&pos| inner.messages[pos].clone())
    }

    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    pub fn streaming_count(&self) -> usize {
        self.lock()
            .messages
            .iter()
            .filter(|m| m.is_streaming())
            .count()
    }

    /// Append a final user message containing the trimmed `text`
    pub fn append_user_message(&self, text: &str) -> Result<Message, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyMessage);
        }

        let message = Message::user(text);
        let mut inner = self.lock();
        inner.push(message.clone());
        self.publish(StoreEvent::Appended(message.clone()));
        Ok(message)
    }

    /// Append the empty, streaming assistant placeholder
    pub fn append_pending_assistant_message(&self) -> Result<Message, StoreError> {
        let mut inner = self.lock();
        if let Some(id) = inner.streaming {
            return Err(StoreError::AlreadyStreaming(id));
        }

        let message = Message::pending_assistant();
        inner.push(message.clone());
        self.publish(StoreEvent::Appended(message.clone()));
        Ok(message)
    }

    /// Append the user message and its assistant placeholder under one lock.
    ///
    /// Either both are appended or neither is: an empty `text` or a reply
    /// that is still streaming leaves the log untouched.
    pub fn append_exchange(&self, text: &str) -> Result<(Message, Message), StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyMessage);
        }

        let mut inner = self.lock();
        if let Some(id) = inner.streaming {
            return Err(StoreError::AlreadyStreaming(id));
        }

        let user = Message::user(text);
        let pending = Message::pending_assistant();
        inner.push(user.clone());
        self.publish(StoreEvent::Appended(user.clone()));
        inner.push(pending.clone());
        self.publish(StoreEvent::Appended(pending.clone()));
        Ok((user, pending))
    }

    /// Extend a streaming message. Empty fragments are ignored.
    pub fn append_fragment(&self, id: MessageId, fragment: &str) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let message = match inner.get_mut(id) {
            Some(m) if m.is_streaming() => m,
            Some(_) => {
                tracing::error!(message_id = %id, "Fragment targeted a finalized message");
                return Err(StoreError::NotFound(id));
            }
            None => {
                tracing::error!(message_id = %id, "Fragment targeted an unknown message");
                return Err(StoreError::NotFound(id));
            }
        };

        if fragment.is_empty() {
            return Ok(());
        }

        message.content.push_str(fragment);
        self.publish(StoreEvent::Fragment {
            id,
            text: fragment.to_string(),
        });
        Ok(())
    }

    /// Mark a message final. Finalizing an already-final message is a no-op.
    pub fn finalize(&self, id: MessageId) -> Result<(), StoreError> {
        self.terminate(id, None)
    }

    /// Overwrite the content and finalize in one step.
    ///
    /// Used for the error fallback so a half-streamed reply is never left
    /// behind. Like [`finalize`](Self::finalize), this leaves an already
    /// final message untouched.
    pub fn replace_and_finalize(&self, id: MessageId, text: &str) -> Result<(), StoreError> {
        self.terminate(id, Some(text))
    }

    fn terminate(&self, id: MessageId, replacement: Option<&str>) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let message = inner.get_mut(id).ok_or(StoreError::NotFound(id))?;

        if !message.is_streaming() {
            tracing::debug!(message_id = %id, "Message already final");
            return Ok(());
        }

        if let Some(text) = replacement {
            message.content = text.to_string();
        }
        message.status = MessageStatus::Final;
        let finalized = message.clone();
        inner.streaming = None;
        self.publish(StoreEvent::Finalized(finalized));
        Ok(())
    }
}
