//! Conversation model and store
//!
//! The store is the single source of truth observed by the rendering
//! surface. Messages are only ever appended; the one in-flight assistant
//! reply is grown fragment by fragment until it is finalized.

mod message;
mod store;

#[cfg(test)]
mod proptests;

pub use message::{Message, MessageId, MessageStatus, Role};
pub use store::{ConversationStore, StoreError, StoreEvent};
