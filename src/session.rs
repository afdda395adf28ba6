//! Conversation session state.
//!
//! One [`ConversationSession`] holds the encoded history of a single logical
//! conversation: the token-id sequence of every prior turn, exactly as the
//! dialogue delegate last returned it. Each generated turn appends the
//! user's encoded utterance (plus the end-of-turn marker), bounds the
//! sequence to the context window, and replaces the history with the
//! delegate's full output so the next turn sees the whole exchange.

use crate::error::{Result, SolaceError};
use crate::model::{DialogueModel, GenerationOptions, TurnCodec};

/// Mutable per-conversation state: the concatenated encoded turn history.
#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    /// Token ids of all prior turns; empty for a fresh conversation.
    encoded_history: Vec<u32>,
}

impl ConversationSession {
    /// Create a fresh session with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens currently held as context.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.encoded_history.len()
    }

    /// Whether the session is indistinguishable from a freshly started one.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.encoded_history.is_empty()
    }

    /// Discard the history unconditionally. Idempotent: after a reset the
    /// next turn behaves as the first turn of a new conversation.
    pub fn reset(&mut self) {
        self.encoded_history.clear();
    }

    /// Run one generated turn: encode `utterance` with the end-of-turn
    /// marker, concatenate onto the existing history, bound the sequence to
    /// `options.max_length` (oldest tokens dropped), invoke the delegate,
    /// decode only the newly generated suffix, and store the delegate's full
    /// output as the new history.
    ///
    /// On any failure the history is left untouched, so a failed turn can be
    /// retried without residue.
    ///
    /// # Errors
    ///
    /// Propagates codec and delegate failures; a delegate output shorter
    /// than its prompt is rejected as malformed.
    pub async fn append_and_generate(
        &mut self,
        codec: &dyn TurnCodec,
        model: &dyn DialogueModel,
        options: &GenerationOptions,
        utterance: &str,
    ) -> Result<String> {
        let turn_ids = codec.encode(utterance)?;

        let mut prompt =
            Vec::with_capacity(self.encoded_history.len() + turn_ids.len() + 1);
        prompt.extend_from_slice(&self.encoded_history);
        prompt.extend_from_slice(&turn_ids);
        prompt.push(codec.end_of_turn_id());

        // Bound total context, keeping the newest tokens.
        if prompt.len() > options.max_length {
            let excess = prompt.len() - options.max_length;
            prompt.drain(..excess);
        }

        let output = model.generate(&prompt, options).await?;
        if output.len() < prompt.len() {
            return Err(SolaceError::Generation(format!(
                "delegate returned {} tokens for a {}-token prompt",
                output.len(),
                prompt.len()
            )));
        }

        let reply = codec.decode(&output[prompt.len()..])?;
        self.encoded_history = output;
        Ok(reply)
    }
}
