//! Remote assistant abstraction
//!
//! The assistant accepts one question and answers with a stream of raw byte
//! chunks. Decoding those bytes into text is the caller's job (see
//! [`Utf8StreamDecoder`]).

mod decoder;
mod error;
mod http;


pub use decoder::Utf8StreamDecoder;
pub use error::{AssistantError, AssistantErrorKind};
pub use http::{AskRequest, HttpAssistant, ASK_PATH};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::sync::Arc;

/// Response body as it arrives off the wire
pub type ChunkStream = BoxStream<'static, Result<Bytes, AssistantError>>;

/// Common interface for remote assistants
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Send the question and open the response body as a byte stream
    async fn ask(&self, question: &str) -> Result<ChunkStream, AssistantError>;

    /// Human-readable name of the backend, for logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: AssistantService + ?Sized> AssistantService for Arc<T> {
    async fn ask(&self, question: &str) -> Result<ChunkStream, AssistantError> {
        (**self).ask(question).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Logging wrapper for assistant services
pub struct LoggingAssistant {
    inner: Arc<dyn AssistantService>,
    name: String,
}

impl LoggingAssistant {
    pub fn new(inner: Arc<dyn AssistantService>) -> Self {
        let name = inner.name().to_string();
        Self { inner, name }
    }
}

#[async_trait]
impl AssistantService for LoggingAssistant {
    async fn ask(&self, question: &str) -> Result<ChunkStream, AssistantError> {
        let start = std::time::Instant::now();
        let result = self.inner.ask(question).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::info!(
                    assistant = %self.name,
                    duration_ms = %duration.as_millis(),
                    question_chars = question.chars().count(),
                    "Assistant response stream opened"
                );
            }
            Err(e) => {
                tracing::error!(
                    assistant = %self.name,
                    duration_ms = %duration.as_millis(),
                    kind = %e.kind,
                    error = %e.message,
                    "Assistant request failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}
