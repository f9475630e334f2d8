//! Mock assistants for testing
//!
//! These mocks let the ingestor and session run without real I/O.

use crate::assistant::{AssistantError, AssistantService, ChunkStream};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Notify};
use tokio_stream::wrappers::UnboundedReceiverStream;

type Reply = Result<Vec<Result<Bytes, AssistantError>>, AssistantError>;

// ============================================================================
// Scripted Assistant
// ============================================================================

/// Assistant that replays queued responses
pub struct ScriptedAssistant {
    replies: Mutex<VecDeque<Reply>>,
    /// Every question asked, in order
    pub questions: Mutex<Vec<String>>,
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Queue a body delivered as the given raw chunks
    pub fn queue_chunks(&self, chunks: &[&[u8]]) {
        let chunks = chunks
            .iter()
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        self.replies.lock().unwrap().push_back(Ok(chunks));
    }

    /// Queue a body that fails with `error` after `chunks`
    pub fn queue_chunks_then_error(&self, chunks: &[&[u8]], error: AssistantError) {
        let mut items: Vec<_> = chunks
            .iter()
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        items.push(Err(error));
        self.replies.lock().unwrap().push_back(Ok(items));
    }

    /// Queue a failure to open the stream at all
    pub fn queue_error(&self, error: AssistantError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl Default for ScriptedAssistant {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssistantService for ScriptedAssistant {
    async fn ask(&self, question: &str) -> Result<ChunkStream, AssistantError> {
        self.questions.lock().unwrap().push(question.to_string());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AssistantError::transport("No mock reply queued")))?;
        Ok(futures::stream::iter(reply).boxed())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// Channel Assistant (for stepping through a stream)
// ============================================================================

/// Assistant whose single response body is fed chunk by chunk from the test.
///
/// The stream stays open until the [`ChunkFeeder`] is dropped.
pub struct ChannelAssistant {
    rx: Mutex<Option<mpsc::UnboundedReceiver<Result<Bytes, AssistantError>>>>,
    /// Notified when the request is issued
    pub request_started: Arc<Notify>,
}

pub struct ChunkFeeder {
    tx: mpsc::UnboundedSender<Result<Bytes, AssistantError>>,
}

impl ChunkFeeder {
    pub fn send(&self, chunk: &[u8]) {
        self.tx.send(Ok(Bytes::copy_from_slice(chunk))).unwrap();
    }

    pub fn fail(&self, error: AssistantError) {
        self.tx.send(Err(error)).unwrap();
    }
}

impl ChannelAssistant {
    pub fn new() -> (Self, ChunkFeeder) {
        let (tx, rx) = mpsc::unbounded_channel();
        let assistant = Self {
            rx: Mutex::new(Some(rx)),
            request_started: Arc::new(Notify::new()),
        };
        (assistant, ChunkFeeder { tx })
    }
}

#[async_trait]
impl AssistantService for ChannelAssistant {
    async fn ask(&self, _question: &str) -> Result<ChunkStream, AssistantError> {
        self.request_started.notify_one();
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| AssistantError::transport("Channel already consumed"))?;
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    fn name(&self) -> &str {
        "channel"
    }
}
