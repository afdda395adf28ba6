//! Dashboard client support.
//!
//! The dashboard keeps its own session-scoped history, independent of the
//! backend's chat log: an ordered message list plus the emotion label of
//! every exchange. On a transport failure the error is rendered inline as
//! the assistant turn instead of crashing the UI session. The log-export
//! action serializes the local message list verbatim.

use crate::config::DashboardConfig;
use crate::error::{Result, SolaceError};
use crate::server::{ChatRequest, ChatResponse, ErrorResponse, ResetRequest, ResetResponse};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Author of a dashboard message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person chatting.
    User,
    /// Replied by the backend (or an inline error standing in for it).
    Assistant,
}

/// One rendered message in the dashboard transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMessage {
    /// Message author.
    pub role: Role,
    /// Message text.
    pub content: String,
}

/// Session-scoped dashboard state: transcript plus emotion history.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    messages: Vec<DashboardMessage>,
    emotions: Vec<String>,
}

impl DashboardState {
    /// Create an empty dashboard session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message.
    pub fn record_user(&mut self, content: String) {
        self.messages.push(DashboardMessage {
            role: Role::User,
            content,
        });
    }

    /// Append an assistant message (a reply or an inline error).
    pub fn record_assistant(&mut self, content: String) {
        self.messages.push(DashboardMessage {
            role: Role::Assistant,
            content,
        });
    }

    /// Record the emotion label of a completed exchange.
    pub fn record_emotion(&mut self, label: String) {
        self.emotions.push(label);
    }

    /// Clear the transcript and the emotion history.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.emotions.clear();
    }

    /// The transcript, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[DashboardMessage] {
        &self.messages
    }

    /// Emotion labels in arrival order.
    #[must_use]
    pub fn emotions(&self) -> &[String] {
        &self.emotions
    }

    /// Completed exchanges (one user turn plus one assistant turn).
    #[must_use]
    pub fn total_exchanges(&self) -> usize {
        self.messages.len() / 2
    }

    /// Emotion counts aggregated in first-seen order.
    #[must_use]
    pub fn emotion_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for label in &self.emotions {
            match counts.iter_mut().find(|(l, _)| l == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label.clone(), 1)),
            }
        }
        counts
    }

    /// Serialize the transcript verbatim as a pretty-printed JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.messages)
            .map_err(|e| SolaceError::Io(std::io::Error::other(e)))
    }

    /// Write the export artifact, overwriting any prior file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_export(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.export_json()?)?;
        Ok(())
    }
}

/// Annotate a backend reply with its classified emotion for display.
#[must_use]
pub fn annotate_reply(reply: &str, emotion: &str) -> String {
    format!("{reply}\n\n[emotion: {emotion}]")
}

/// Widest bar drawn by [`emotion_bars`].
const BAR_WIDTH: usize = 40;

/// Render emotion counts as a text bar chart, one row per label in
/// first-seen order. Returns an empty string when nothing is recorded yet.
#[must_use]
pub fn emotion_bars(counts: &[(String, usize)]) -> String {
    let max_count = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if max_count == 0 {
        return String::new();
    }
    let label_width = counts.iter().map(|(l, _)| l.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (label, count) in counts {
        let bar_len = (count * BAR_WIDTH).div_ceil(max_count).min(BAR_WIDTH);
        out.push_str(&format!(
            "{label:<label_width$}  {} {count}\n",
            "█".repeat(bar_len)
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

/// HTTP client for the backend API, bound to one session id.
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    session: String,
}

impl ChatClient {
    /// Build a client for the configured base URL and the given session id.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &DashboardConfig, session: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SolaceError::Config(format!("failed to build dashboard client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            session,
        })
    }

    /// Send one chat message and return the backend's reply.
    ///
    /// # Errors
    ///
    /// Returns [`SolaceError::Http`] on transport failures or non-success
    /// statuses; the caller renders it inline, never as a fake reply.
    pub async fn chat(&self, message: &str) -> Result<ChatResponse> {
        let body = ChatRequest {
            message: Some(message.to_owned()),
            session: Some(self.session.clone()),
        };

        let response = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SolaceError::Http(format!("backend not responding: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| "no detail".to_owned());
            return Err(SolaceError::Http(format!("backend {status}: {detail}")));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| SolaceError::Http(format!("malformed backend response: {e}")))
    }

    /// Reset this session's conversation on the backend.
    ///
    /// # Errors
    ///
    /// Returns [`SolaceError::Http`] on transport failures or non-success
    /// statuses.
    pub async fn reset(&self) -> Result<String> {
        let body = ResetRequest {
            session: Some(self.session.clone()),
        };

        let response = self
            .http
            .post(format!("{}/reset", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SolaceError::Http(format!("backend not responding: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SolaceError::Http(format!("backend reset failed: {status}")));
        }

        response
            .json::<ResetResponse>()
            .await
            .map(|r| r.message)
            .map_err(|e| SolaceError::Http(format!("malformed backend response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn populated_state() -> DashboardState {
        let mut state = DashboardState::new();
        state.record_user("hello".to_owned());
        state.record_assistant("hi there".to_owned());
        state.record_emotion("joy".to_owned());
        state.record_user("I'm worried".to_owned());
        state.record_assistant("tell me more".to_owned());
        state.record_emotion("fear".to_owned());
        state.record_user("still worried".to_owned());
        state.record_assistant("that's understandable".to_owned());
        state.record_emotion("fear".to_owned());
        state
    }

    #[test]
    fn export_round_trip_equals_in_memory_list() {
        let state = populated_state();
        let json = state.export_json().unwrap();
        let parsed: Vec<DashboardMessage> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state.messages());
    }

    #[test]
    fn export_overwrites_prior_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_logs.json");
        std::fs::write(&path, "stale contents").unwrap();

        let state = populated_state();
        state.write_export(&path).unwrap();

        let parsed: Vec<DashboardMessage> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 6);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let state = populated_state();
        let json = state.export_json().unwrap();
        assert!(json.contains(r#""role": "user""#));
        assert!(json.contains(r#""role": "assistant""#));
    }

    #[test]
    fn emotion_counts_in_first_seen_order() {
        let state = populated_state();
        let counts = state.emotion_counts();
        assert_eq!(
            counts,
            vec![("joy".to_owned(), 1), ("fear".to_owned(), 2)]
        );
    }

    #[test]
    fn total_exchanges_pairs_messages() {
        let state = populated_state();
        assert_eq!(state.total_exchanges(), 3);
    }

    #[test]
    fn reset_clears_transcript_and_emotions() {
        let mut state = populated_state();
        state.reset();
        assert!(state.messages().is_empty());
        assert!(state.emotions().is_empty());
        assert_eq!(state.total_exchanges(), 0);
    }

    #[test]
    fn inline_error_keeps_prior_history() {
        let mut state = populated_state();
        let before = state.messages().len();
        state.record_assistant("backend not responding: connection refused".to_owned());
        assert_eq!(state.messages().len(), before + 1);
        assert_eq!(state.messages()[0].content, "hello");
    }

    #[test]
    fn bars_scale_to_the_largest_count() {
        let counts = vec![("fear".to_owned(), 4), ("joy".to_owned(), 1)];
        let chart = emotion_bars(&counts);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(&"█".repeat(BAR_WIDTH)));
        assert!(lines[0].ends_with("4"));
        assert!(lines[1].ends_with("1"));
    }

    #[test]
    fn bars_empty_without_data() {
        assert!(emotion_bars(&[]).is_empty());
    }

    #[test]
    fn annotated_reply_carries_the_label() {
        let text = annotate_reply("I'm here for you.", "sadness");
        assert!(text.starts_with("I'm here for you."));
        assert!(text.ends_with("[emotion: sadness]"));
    }
}
