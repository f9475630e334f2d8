//! Conversation session
//!
//! The surface the UI talks to: submit a question, observe the message log,
//! observe the busy indicator. Owns the store and the ingestor.

use crate::assistant::AssistantService;
use crate::config::ChatConfig;
use crate::conversation::{ConversationStore, Message, StoreEvent};
use crate::ingest::{BusyFlag, ExchangeOutcome, StreamIngestor};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, watch};

/// Submission refused before anything was dispatched
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Question is empty")]
    Empty,
    #[error("Question is {actual} characters long (limit {max})")]
    TooLong { max: usize, actual: usize },
    #[error("An answer is still streaming")]
    Busy,
}

pub struct ChatSession<A: AssistantService> {
    store: Arc<ConversationStore>,
    ingestor: StreamIngestor<A>,
    max_question_chars: usize,
}

impl<A: AssistantService> ChatSession<A> {
    pub fn new(config: &ChatConfig, assistant: A) -> Self {
        Self {
            store: Arc::new(ConversationStore::new(config.greeting.clone())),
            ingestor: StreamIngestor::new(assistant, BusyFlag::new(), config.error_message.clone()),
            max_question_chars: config.max_question_chars,
        }
    }

    /// Submit a question and wait for the exchange to reach its terminal
    /// state. Progress is visible through [`subscribe`](Self::subscribe)
    /// while this is pending.
    pub async fn submit(&self, text: &str) -> Result<ExchangeOutcome, SubmitError> {
        let question = text.trim();
        if question.is_empty() {
            return Err(SubmitError::Empty);
        }

        let actual = question.chars().count();
        if actual > self.max_question_chars {
            return Err(SubmitError::TooLong {
                max: self.max_question_chars,
                actual,
            });
        }

        match self.ingestor.run(question, &self.store).await {
            ExchangeOutcome::Busy => Err(SubmitError::Busy),
            outcome => Ok(outcome),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.store.snapshot()
    }

    pub fn busy(&self) -> watch::Receiver<bool> {
        self.ingestor.busy().subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.ingestor.busy().is_busy()
    }
}
