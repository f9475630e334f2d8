//! Stream Chat - incremental rendering of streamed assistant replies
//!
//! A question goes in, a user message and an assistant placeholder are
//! appended, and the placeholder grows as response chunks arrive until it
//! reaches a terminal state.

pub mod assistant;
pub mod config;
pub mod conversation;
pub mod echo;
pub mod ingest;
pub mod logging;
pub mod render;
pub mod session;

pub use config::ChatConfig;
pub use session::{ChatSession, SubmitError};
