//! Plain-text transcript rendering
//!
//! Turns store events into terminal output. Streaming replies are printed
//! incrementally: each fragment is written as it arrives.

use crate::conversation::{Message, MessageId, Role, StoreEvent};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct TranscriptRenderer {
    /// Content already written for each message still being streamed
    printed: HashMap<MessageId, String>,
}

impl TranscriptRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a complete message with its header
    pub fn render_message(message: &Message) -> String {
        format!("{}{}\n", header(message), message.content)
    }

    /// Text to write for one event. User messages are not echoed since the
    /// terminal already shows what was typed.
    pub fn apply(&mut self, event: &StoreEvent) -> String {
        match event {
            StoreEvent::Appended(message) => {
                if message.role == Role::User {
                    return String::new();
                }
                if !message.is_streaming() {
                    return Self::render_message(message);
                }
                self.printed.insert(message.id, message.content.clone());
                format!("{}{}", header(message), message.content)
            }
            StoreEvent::Fragment { id, text } => {
                self.printed.entry(*id).or_default().push_str(text);
                text.clone()
            }
            StoreEvent::Finalized(message) => {
                let printed = self.printed.remove(&message.id).unwrap_or_default();
                let mut out = match message.content.strip_prefix(printed.as_str()) {
                    Some(rest) => rest.to_string(),
                    // Content was replaced (error fallback): start a fresh line
                    None => format!("\n{}", message.content),
                };
                out.push('\n');
                out
            }
        }
    }
}

fn header(message: &Message) -> String {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    format!("[{}] {who}: ", message.display_time())
}
