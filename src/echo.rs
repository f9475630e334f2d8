//! Development echo assistant
//!
//! Answers `POST /api/ask` by streaming the question back in small chunks,
//! deliberately cutting through multi-byte characters. Used by the
//! `stream-chat-echo` binary and by the HTTP tests.

use crate::assistant::{AskRequest, ASK_PATH};
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use futures::StreamExt;
use std::convert::Infallible;
use std::time::Duration;

/// Chunking behaviour of the echo reply
#[derive(Debug, Clone, Copy)]
pub struct EchoOptions {
    /// Bytes per chunk; small values split characters
    pub chunk_bytes: usize,
    /// Pause before each chunk
    pub delay: Duration,
}

impl Default for EchoOptions {
    fn default() -> Self {
        Self {
            chunk_bytes: 5,
            delay: Duration::from_millis(40),
        }
    }
}

pub fn router(options: EchoOptions) -> Router {
    Router::new().route(
        ASK_PATH,
        post(move |Json(req): Json<AskRequest>| ask(options, req)),
    )
}

#[allow(clippy::needless_pass_by_value)] // handler owns the extracted body
async fn ask(options: EchoOptions, req: AskRequest) -> Response {
    let question = req.question.trim();
    if question.is_empty() {
        return (StatusCode::BAD_REQUEST, "question is empty").into_response();
    }

    tracing::debug!(question_chars = question.chars().count(), "Echoing question");

    let reply = format!("You asked: {question}").into_bytes();
    let chunks: Vec<Bytes> = reply
        .chunks(options.chunk_bytes.max(1))
        .map(Bytes::copy_from_slice)
        .collect();

    let delay = options.delay;
    let body = futures::stream::iter(chunks).then(move |chunk| async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok::<_, Infallible>(chunk)
    });

    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response()
}

/// Serve `router` on an ephemeral local port, returning its base URL
#[cfg(test)]
pub async fn serve_for_test(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
