//! Interactive terminal chat
//!
//! Reads questions from stdin, one per line, and prints the assistant's
//! reply as it streams in. Logs go to stderr.

use std::io::Write;
use std::sync::Arc;
use stream_chat::assistant::{HttpAssistant, LoggingAssistant};
use stream_chat::render::TranscriptRenderer;
use stream_chat::{ChatConfig, ChatSession, SubmitError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    stream_chat::logging::init("stream_chat=warn");

    let config = ChatConfig::from_env()?;
    let http = HttpAssistant::new(&config.base_url, config.io_timeout)?;
    tracing::info!(endpoint = %http.endpoint(), "Assistant configured");
    let assistant = LoggingAssistant::new(Arc::new(http));
    let session = ChatSession::new(&config, assistant);

    let mut stdout = std::io::stdout();
    for message in session.snapshot() {
        write!(stdout, "{}", TranscriptRenderer::render_message(&message))?;
    }
    stdout.flush()?;

    let mut events = session.subscribe();
    let renderer = tokio::spawn(async move {
        let mut renderer = TranscriptRenderer::new();
        let mut stdout = std::io::stdout();
        loop {
            match events.recv().await {
                Ok(event) => {
                    let _ = write!(stdout, "{}", renderer.apply(&event));
                    let _ = stdout.flush();
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Renderer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match session.submit(&line).await {
            Ok(_) | Err(SubmitError::Empty) => {}
            Err(e) => eprintln!("{e}"),
        }
    }

    drop(session);
    renderer.await?;
    Ok(())
}
