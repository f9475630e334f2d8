//! HTTP assistant client
//!
//! POSTs the question as JSON and hands back the chunked response body
//! untouched. No framing is assumed: the whole body is one text stream.

use super::{AssistantError, AssistantService, ChunkStream};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed path appended to the configured base URL
pub const ASK_PATH: &str = "/api/ask";

/// Request body: the question is the only field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Assistant reached over HTTP
pub struct HttpAssistant {
    client: Client,
    endpoint: String,
}

impl HttpAssistant {
    /// `timeout` bounds connecting and each wait for the next chunk. A
    /// reply that keeps producing chunks may stream for as long as it likes.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| AssistantError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: build_endpoint(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn build_endpoint(base_url: &str) -> String {
    format!("{}{ASK_PATH}", base_url.trim_end_matches('/'))
}

#[async_trait]
impl AssistantService for HttpAssistant {
    async fn ask(&self, question: &str) -> Result<ChunkStream, AssistantError> {
        let body = AskRequest {
            question: question.trim().to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::transport(format!("Network error: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AssistantError::transport(format!(
                "Assistant returned {status}: {text}"
            )));
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| AssistantError::transport(format!("Connection failed mid-stream: {e}")));
        Ok(stream.boxed())
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}
