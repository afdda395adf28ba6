//! Response generation orchestrator.
//!
//! Checks the keyword override table before anything else: a hit returns
//! the canned reply (with its helpline) and bypasses the generative model
//! entirely, leaving the session history untouched. Everything else runs
//! the session's generate flow against the dialogue delegate.

use crate::error::Result;
use crate::keywords::KeywordTable;
use crate::model::{DialogueModel, GenerationOptions, TurnCodec};
use crate::session::ConversationSession;
use std::sync::Arc;
use tracing::debug;

/// Orchestrates keyword overrides and delegated generation.
pub struct Responder {
    keywords: KeywordTable,
    codec: Arc<dyn TurnCodec>,
    model: Arc<dyn DialogueModel>,
    options: GenerationOptions,
}

impl Responder {
    /// Assemble a responder from its collaborators.
    pub fn new(
        keywords: KeywordTable,
        codec: Arc<dyn TurnCodec>,
        model: Arc<dyn DialogueModel>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            keywords,
            codec,
            model,
            options,
        }
    }

    /// Produce the reply for `input` within the given session.
    ///
    /// # Errors
    ///
    /// Propagates codec and dialogue-delegate failures; keyword hits cannot
    /// fail.
    pub async fn respond(&self, session: &mut ConversationSession, input: &str) -> Result<String> {
        if let Some(entry) = self.keywords.lookup(input) {
            debug!("keyword override hit: {}", entry.keyword);
            return Ok(entry.canned_reply());
        }

        session
            .append_and_generate(self.codec.as_ref(), self.model.as_ref(), &self.options, input)
            .await
    }
}
