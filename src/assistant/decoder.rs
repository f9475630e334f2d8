//! Incremental UTF-8 decoding of a chunked byte stream
//!
//! Chunk boundaries fall wherever the network puts them, including inside a
//! multi-byte character. The decoder holds back the trailing bytes of an
//! incomplete character and prepends them to the next chunk.

use super::AssistantError;
use std::str;

/// Longest possible incomplete UTF-8 sequence
const MAX_CARRY: usize = 3;

#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    carry: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes held back waiting for the rest of a character
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    /// Decode the next chunk, returning every complete character available.
    ///
    /// The result may be empty when the chunk only continues a held-back
    /// character.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String, AssistantError> {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.extend_from_slice(chunk);

        match str::from_utf8(&bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(e) => {
                // error_len() is None only when the input ends mid-character
                if let Some(bad) = e.error_len() {
                    return Err(AssistantError::decode(format!(
                        "invalid UTF-8 sequence of {bad} byte(s) after {} valid byte(s)",
                        e.valid_up_to()
                    )));
                }

                let valid = e.valid_up_to();
                let tail = bytes.split_off(valid);
                debug_assert!(tail.len() <= MAX_CARRY);
                self.carry = tail;
                // The prefix was just validated
                String::from_utf8(bytes).map_err(|e| AssistantError::decode(e.to_string()))
            }
        }
    }

    /// Signal end of stream. Leftover bytes mean the stream was cut inside
    /// a character.
    pub fn finish(self) -> Result<(), AssistantError> {
        if self.carry.is_empty() {
            Ok(())
        } else {
            Err(AssistantError::decode(format!(
                "stream ended inside a character ({} dangling byte(s))",
                self.carry.len()
            )))
        }
    }
}
