//! `tokenizers`-backed turn codec.
//!
//! Loads a HuggingFace `tokenizer.json` matching the dialogue delegate's
//! vocabulary. The end-of-turn token (DialoGPT-style `<|endoftext|>`) must
//! exist in that vocabulary; a missing token is a startup error, not a
//! per-request one.

use crate::error::{Result, SolaceError};
use crate::model::TurnCodec;
use std::path::Path;
use tokenizers::Tokenizer;
use tracing::info;

/// Turn codec backed by a `tokenizer.json` file.
pub struct HfTurnCodec {
    tokenizer: Tokenizer,
    end_of_turn_id: u32,
}

impl HfTurnCodec {
    /// Load the tokenizer and resolve the end-of-turn token id.
    ///
    /// # Errors
    ///
    /// Returns [`SolaceError::Tokenizer`] if the file cannot be loaded or the
    /// end-of-turn token is not in the vocabulary.
    pub fn from_file(path: &Path, end_of_turn_token: &str) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            SolaceError::Tokenizer(format!("failed to load {}: {e}", path.display()))
        })?;

        let end_of_turn_id = tokenizer.token_to_id(end_of_turn_token).ok_or_else(|| {
            SolaceError::Tokenizer(format!(
                "end-of-turn token {end_of_turn_token:?} not in the vocabulary of {}",
                path.display()
            ))
        })?;

        info!(
            "loaded tokenizer from {} (end-of-turn id {end_of_turn_id})",
            path.display()
        );

        Ok(Self {
            tokenizer,
            end_of_turn_id,
        })
    }
}

impl TurnCodec for HfTurnCodec {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| SolaceError::Tokenizer(format!("encode failed: {e}")))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| SolaceError::Tokenizer(format!("decode failed: {e}")))
    }

    fn end_of_turn_id(&self) -> u32 {
        self.end_of_turn_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_tokenizer_error() {
        let err = HfTurnCodec::from_file(Path::new("/nonexistent/tokenizer.json"), "<|endoftext|>")
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("tokenizer error"));
    }
}
