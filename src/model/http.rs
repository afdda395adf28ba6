//! HTTP implementations of the model delegates.
//!
//! Wire contracts:
//!
//! - Generation: `POST {endpoint}/generate` with
//!   `{input_ids, max_length, temperature, top_k, top_p,
//!   no_repeat_ngram_size, do_sample}` → `{output_ids}` (the full sequence,
//!   prompt included).
//! - Classification: `POST {endpoint}/classify` with `{inputs}` →
//!   `[[{label, score}, ...]]` (HF text-classification shape; a flat
//!   `[{label, score}]` array is also accepted).
//!
//! Every call is bounded by the configured timeout. Failures map to
//! distinguishable error variants so the API surface can tell "backend
//! unavailable" from "model failure"; no failure becomes an empty reply.

use crate::config::{EmotionConfig, GenerationConfig};
use crate::error::{Result, SolaceError};
use crate::model::{DialogueModel, EmotionModel, EmotionScore, GenerationOptions};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Build a [`reqwest::Client`] with the given request timeout.
fn build_client(timeout_seconds: u64, what: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| SolaceError::Config(format!("failed to build {what} HTTP client: {e}")))
}

fn delegate_url(endpoint: &str, path: &str) -> String {
    format!("{}/{path}", endpoint.trim_end_matches('/'))
}

// ── Dialogue generation ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    input_ids: &'a [u32],
    max_length: usize,
    temperature: f64,
    top_k: usize,
    top_p: f64,
    no_repeat_ngram_size: usize,
    do_sample: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    output_ids: Vec<u32>,
}

/// Dialogue delegate backed by an HTTP generation service.
pub struct HttpDialogueModel {
    client: reqwest::Client,
    url: String,
}

impl HttpDialogueModel {
    /// Build the client from the generation config section.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds, "generation")?,
            url: delegate_url(&config.endpoint, "generate"),
        })
    }
}

#[async_trait]
impl DialogueModel for HttpDialogueModel {
    async fn generate(&self, input_ids: &[u32], options: &GenerationOptions) -> Result<Vec<u32>> {
        let body = GenerateRequest {
            input_ids,
            max_length: options.max_length,
            temperature: options.temperature,
            top_k: options.top_k,
            top_p: options.top_p,
            no_repeat_ngram_size: options.no_repeat_ngram_size,
            do_sample: true,
        };

        debug!("generation request: {} prompt tokens", input_ids.len());

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SolaceError::Timeout(format!("generation delegate: {e}"))
                } else {
                    SolaceError::Generation(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SolaceError::Generation(format!(
                "delegate returned {status}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SolaceError::Generation(format!("malformed delegate response: {e}")))?;

        Ok(parsed.output_ids)
    }
}

// ── Emotion classification ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

/// Accepts both the nested HF pipeline shape and a flat ranking.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<EmotionScore>>),
    Flat(Vec<EmotionScore>),
}

impl ClassifyResponse {
    fn into_ranking(self) -> Vec<EmotionScore> {
        match self {
            Self::Nested(mut outer) => {
                if outer.is_empty() {
                    Vec::new()
                } else {
                    outer.swap_remove(0)
                }
            }
            Self::Flat(ranking) => ranking,
        }
    }
}

/// Emotion delegate backed by an HTTP classification service.
pub struct HttpEmotionModel {
    client: reqwest::Client,
    url: String,
}

impl HttpEmotionModel {
    /// Build the client from the emotion config section.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &EmotionConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_seconds, "classification")?,
            url: delegate_url(&config.endpoint, "classify"),
        })
    }
}

#[async_trait]
impl EmotionModel for HttpEmotionModel {
    async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>> {
        let body = ClassifyRequest { inputs: text };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SolaceError::Timeout(format!("classification delegate: {e}"))
                } else {
                    SolaceError::Classification(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SolaceError::Classification(format!(
                "delegate returned {status}"
            )));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| SolaceError::Classification(format!("malformed delegate response: {e}")))?;

        Ok(parsed.into_ranking())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn delegate_url_strips_trailing_slash() {
        assert_eq!(
            delegate_url("http://localhost:8600/", "generate"),
            "http://localhost:8600/generate"
        );
        assert_eq!(
            delegate_url("http://localhost:8601", "classify"),
            "http://localhost:8601/classify"
        );
    }

    #[test]
    fn nested_classify_response_unwraps_first_ranking() {
        let json = r#"[[{"label": "sadness", "score": 0.91}, {"label": "joy", "score": 0.05}]]"#;
        let parsed: ClassifyResponse = serde_json::from_str(json).unwrap();
        let ranking = parsed.into_ranking();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].label, "sadness");
    }

    #[test]
    fn flat_classify_response_accepted() {
        let json = r#"[{"label": "anger", "score": 0.66}]"#;
        let parsed: ClassifyResponse = serde_json::from_str(json).unwrap();
        let ranking = parsed.into_ranking();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].label, "anger");
    }

    #[test]
    fn empty_nested_response_yields_empty_ranking() {
        let parsed: ClassifyResponse = serde_json::from_str("[]").unwrap();
        assert!(parsed.into_ranking().is_empty());
    }
}
