//! Backend chat log.
//!
//! An in-memory, append-only record of completed turns for one session.
//! Turns are never mutated after recording; the whole log clears in bulk on
//! reset. Enumeration is the only read operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed exchange: user input, reply, and the classified emotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// When the turn completed.
    pub timestamp: DateTime<Utc>,
    /// The user's utterance.
    pub user_input: String,
    /// The reply delivered (canned or generated).
    pub response: String,
    /// Top-1 emotion label for the user's utterance.
    pub emotion: String,
    /// Classifier confidence in `0.0..=1.0`.
    pub score: f32,
}

impl ChatTurn {
    /// Build a turn stamped with the current time.
    #[must_use]
    pub fn now(user_input: String, response: String, emotion: String, score: f32) -> Self {
        Self {
            timestamp: Utc::now(),
            user_input,
            response,
            emotion,
            score,
        }
    }
}

/// Append-only chat log; insertion order is chronological order.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    turns: Vec<ChatTurn>,
}

impl ChatLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn.
    pub fn record(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// Drop every recorded turn. Idempotent.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Full enumeration, oldest first.
    #[must_use]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Number of recorded turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
