//! Stream ingestion
//!
//! Drives one question/answer exchange: appends the user message and the
//! assistant placeholder, streams the reply into the placeholder, and always
//! leaves it in a terminal state.
//!
//! Placeholder lifecycle:
//! `streaming --fragment--> streaming`, `streaming --end--> final`,
//! `streaming --error--> final (fallback text)`.

mod busy;

#[cfg(test)]
pub mod testing;

pub use busy::BusyFlag;

use crate::assistant::{AssistantError, AssistantService, Utf8StreamDecoder};
use crate::conversation::{ConversationStore, MessageId, StoreError};
use futures::StreamExt;
use std::time::Instant;
use thiserror::Error;
use tracing::Instrument;

/// Why an exchange ended in the failure state
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    /// Sequencing fault inside the store, not a user-facing condition
    #[error("Store rejected fragment: {0}")]
    Store(#[from] StoreError),
}

/// How an exchange ended
#[derive(Debug)]
pub enum ExchangeOutcome {
    /// Stream ended cleanly; the placeholder holds the full reply
    Completed { message_id: MessageId },
    /// The placeholder was replaced with the fallback message
    Failed {
        message_id: MessageId,
        error: ExchangeError,
    },
    /// Nothing was dispatched
    Rejected(StoreError),
    /// Another exchange holds the busy flag; nothing was dispatched
    Busy,
}

impl ExchangeOutcome {
    /// The assistant message this exchange produced, if any
    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            Self::Completed { message_id } | Self::Failed { message_id, .. } => Some(*message_id),
            Self::Rejected(_) | Self::Busy => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[derive(Debug, Default)]
struct StreamStats {
    chunks: usize,
    bytes: usize,
    fragments: usize,
}

/// Runs exchanges against an assistant.
///
/// At most one `run` holds the busy flag at a time; a second one returns
/// [`ExchangeOutcome::Busy`] without dispatching.
pub struct StreamIngestor<A: AssistantService> {
    assistant: A,
    busy: BusyFlag,
    fallback_message: String,
}

impl<A: AssistantService> StreamIngestor<A> {
    pub fn new(assistant: A, busy: BusyFlag, fallback_message: impl Into<String>) -> Self {
        Self {
            assistant,
            busy,
            fallback_message: fallback_message.into(),
        }
    }

    pub fn busy(&self) -> &BusyFlag {
        &self.busy
    }

    /// Execute one exchange to its terminal state.
    ///
    /// Failures never escape: they end up as the fallback message in the
    /// store and as [`ExchangeOutcome::Failed`]. The busy flag is held from
    /// dispatch until after the terminal write. An empty question is
    /// rejected before the flag is touched.
    pub async fn run(&self, question: &str, store: &ConversationStore) -> ExchangeOutcome {
        let question = question.trim();
        if question.is_empty() {
            tracing::debug!("Empty question rejected");
            return ExchangeOutcome::Rejected(StoreError::EmptyMessage);
        }

        let Some(busy) = self.busy.try_acquire() else {
            tracing::debug!("Exchange already in flight");
            return ExchangeOutcome::Busy;
        };

        let (user, target) = match store.append_exchange(question) {
            Ok((user, pending)) => (user, pending.id),
            Err(e) => {
                tracing::error!(error = %e, "Could not open exchange");
                return ExchangeOutcome::Rejected(e);
            }
        };

        let span = tracing::info_span!(
            "exchange",
            assistant = %self.assistant.name(),
            message_id = %target,
        );
        let start = Instant::now();
        let result = self
            .stream_into(&user.content, target, store)
            .instrument(span.clone())
            .await;

        let outcome = span.in_scope(|| match result {
            Ok(stats) => {
                if let Err(e) = store.finalize(target) {
                    tracing::error!(error = %e, "Finalize failed");
                }
                tracing::info!(
                    duration_ms = %start.elapsed().as_millis(),
                    chunks = stats.chunks,
                    bytes = stats.bytes,
                    fragments = stats.fragments,
                    "Exchange completed"
                );
                ExchangeOutcome::Completed { message_id: target }
            }
            Err(error) => {
                match &error {
                    ExchangeError::Assistant(e) => tracing::error!(
                        duration_ms = %start.elapsed().as_millis(),
                        kind = %e.kind,
                        error = %e.message,
                        "Exchange failed"
                    ),
                    ExchangeError::Store(e) => tracing::error!(
                        error = %e,
                        "Exchange aborted by store sequencing fault"
                    ),
                }
                if let Err(e) = store.replace_and_finalize(target, &self.fallback_message) {
                    tracing::error!(error = %e, "Fallback write failed");
                }
                ExchangeOutcome::Failed {
                    message_id: target,
                    error,
                }
            }
        });

        drop(busy);
        outcome
    }

    async fn stream_into(
        &self,
        question: &str,
        target: MessageId,
        store: &ConversationStore,
    ) -> Result<StreamStats, ExchangeError> {
        let mut stream = self.assistant.ask(question).await?;
        let mut decoder = Utf8StreamDecoder::new();
        let mut stats = StreamStats::default();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            stats.chunks += 1;
            stats.bytes += chunk.len();

            let fragment = decoder.decode(&chunk)?;
            if fragment.is_empty() {
                continue;
            }
            store.append_fragment(target, &fragment)?;
            stats.fragments += 1;
        }

        decoder.finish()?;
        Ok(stats)
    }
}
