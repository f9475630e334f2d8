//! Local echo assistant for development
//!
//! Streams each question back in small chunks so the chat front end can be
//! exercised without a real assistant.

use std::net::SocketAddr;
use stream_chat::echo::{self, EchoOptions};
use stream_chat::ChatConfig;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    stream_chat::logging::init("stream_chat=info,tower_http=debug");

    let config = ChatConfig::from_env()?;
    let app = echo::router(EchoOptions::default()).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], config.echo_port));
    tracing::info!("Echo assistant listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
