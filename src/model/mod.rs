//! Pretrained-model delegates.
//!
//! Both models are opaque services behind narrow interfaces: the dialogue
//! model continues a token sequence, the emotion model ranks labels for an
//! utterance. Concrete backends are interchangeable behind the traits, so
//! tests substitute stubs and production wires the HTTP implementations in
//! [`http`].

pub mod codec;
pub mod http;

pub use codec::HfTurnCodec;
pub use http::{HttpDialogueModel, HttpEmotionModel};

use crate::config::GenerationConfig;
use crate::error::{Result, SolaceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling options passed through to the dialogue delegate verbatim.
///
/// Generation is stochastic (temperature plus top-k/top-p truncation);
/// identical inputs are not guaranteed identical outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Maximum total sequence length (prompt + sampled tokens).
    pub max_length: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// Top-k truncation.
    pub top_k: usize,
    /// Nucleus (top-p) truncation.
    pub top_p: f64,
    /// N-gram size the delegate must not repeat.
    pub no_repeat_ngram_size: usize,
}

impl GenerationOptions {
    /// Derive options from the generation config section.
    #[must_use]
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_length: config.max_context_tokens,
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            no_repeat_ngram_size: config.no_repeat_ngram_size,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

/// One ranked emotion label with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    /// Emotion label (e.g. `sadness`, `joy`).
    pub label: String,
    /// Confidence in the range `0.0..=1.0`.
    pub score: f32,
}

/// Turn encoding/decoding for the dialogue delegate's vocabulary.
///
/// Sits behind a trait so session logic is testable without a real
/// `tokenizer.json`; production uses [`HfTurnCodec`].
pub trait TurnCodec: Send + Sync {
    /// Encode text into token ids (no special tokens added).
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Decode token ids back to text, skipping special tokens.
    fn decode(&self, ids: &[u32]) -> Result<String>;

    /// Token id appended after each encoded utterance.
    fn end_of_turn_id(&self) -> u32;
}

/// Dialogue-generation delegate: continues a token sequence.
///
/// Returns the full output sequence (the prompt followed by the newly
/// sampled tokens), never just the continuation.
#[async_trait]
pub trait DialogueModel: Send + Sync {
    /// Generate a continuation of `input_ids` under the given sampling options.
    async fn generate(&self, input_ids: &[u32], options: &GenerationOptions) -> Result<Vec<u32>>;
}

/// Emotion-classification delegate: ranks labels for one utterance.
#[async_trait]
pub trait EmotionModel: Send + Sync {
    /// Classify `text`, returning ranked `(label, score)` pairs.
    async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>>;
}

/// Extract the top-1 emotion from a delegate's ranked result.
///
/// # Errors
///
/// Returns [`SolaceError::Classification`] if the ranking is empty or the
/// winning score falls outside `0.0..=1.0` (a malformed delegate result,
/// never silently clamped).
pub fn top_emotion(scores: Vec<EmotionScore>) -> Result<EmotionScore> {
    let top = scores
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| {
            SolaceError::Classification("delegate returned an empty ranking".to_owned())
        })?;
    if !(0.0..=1.0).contains(&top.score) {
        return Err(SolaceError::Classification(format!(
            "delegate score {} outside [0, 1]",
            top.score
        )));
    }
    Ok(top)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn score(label: &str, score: f32) -> EmotionScore {
        EmotionScore {
            label: label.to_owned(),
            score,
        }
    }

    #[test]
    fn top_emotion_picks_highest_score() {
        let ranked = vec![score("sadness", 0.2), score("joy", 0.7), score("fear", 0.1)];
        let top = top_emotion(ranked).unwrap();
        assert_eq!(top.label, "joy");
        assert!((top.score - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn top_emotion_rejects_empty_ranking() {
        let err = top_emotion(vec![]).unwrap_err();
        assert!(err.to_string().contains("empty ranking"));
    }

    #[test]
    fn top_emotion_rejects_out_of_range_score() {
        let err = top_emotion(vec![score("joy", 1.7)]).unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn options_follow_config() {
        let config = GenerationConfig {
            max_context_tokens: 512,
            top_k: 10,
            ..Default::default()
        };
        let options = GenerationOptions::from_config(&config);
        assert_eq!(options.max_length, 512);
        assert_eq!(options.top_k, 10);
        assert_eq!(options.no_repeat_ngram_size, 3);
    }
}
