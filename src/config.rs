//! Runtime configuration
//!
//! Read from `STREAM_CHAT_*` environment variables, falling back to defaults
//! suitable for talking to the local echo assistant.

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8787";
pub const DEFAULT_MAX_QUESTION_CHARS: usize = 2000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_ECHO_PORT: u16 = 8787;
pub const DEFAULT_GREETING: &str =
    "Hi! Ask me anything and I'll start answering as soon as the reply arrives.";
pub const DEFAULT_ERROR_MESSAGE: &str =
    "Sorry, something went wrong while getting an answer. Please try again.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the assistant; the ask path is appended
    pub base_url: String,
    /// Submissions longer than this (in chars) are refused before dispatch
    pub max_question_chars: usize,
    /// Limit on connecting and on each gap between reply chunks
    pub io_timeout: Duration,
    /// Seeded assistant message shown before any interaction
    pub greeting: String,
    /// Fixed text that replaces a failed reply
    pub error_message: String,
    /// Port for the development echo assistant
    pub echo_port: u16,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_question_chars: DEFAULT_MAX_QUESTION_CHARS,
            io_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            greeting: DEFAULT_GREETING.to_string(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            echo_port: DEFAULT_ECHO_PORT,
        }
    }
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup("STREAM_CHAT_BASE_URL") {
            config.base_url = url;
        }
        if let Some(max) = parse(&lookup, "STREAM_CHAT_MAX_QUESTION_CHARS")? {
            config.max_question_chars = max;
        }
        if let Some(secs) = parse(&lookup, "STREAM_CHAT_TIMEOUT_SECS")? {
            config.io_timeout = Duration::from_secs(secs);
        }
        if let Some(greeting) = lookup("STREAM_CHAT_GREETING") {
            config.greeting = greeting;
        }
        if let Some(message) = lookup("STREAM_CHAT_ERROR_MESSAGE") {
            config.error_message = message;
        }
        if let Some(port) = parse(&lookup, "STREAM_CHAT_ECHO_PORT")? {
            config.echo_port = port;
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
