//! Session registry.
//!
//! Conversation state is never process-global: each caller-supplied session
//! id owns an independent [`ConversationSession`] plus [`ChatLog`], checked
//! out of the registry by the request handlers. Turns within one session
//! serialize on the entry's async lock; distinct sessions proceed
//! independently. Callers that send no id share [`DEFAULT_SESSION_ID`],
//! so a single interactive user still gets one ongoing conversation.

use crate::session::ConversationSession;
use crate::transcript::ChatLog;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Session id used when a request carries none.
pub const DEFAULT_SESSION_ID: &str = "default";

/// The per-session state owned by one registry slot.
#[derive(Debug, Default)]
pub struct SessionEntry {
    /// Encoded conversation history.
    pub session: ConversationSession,
    /// Completed-turn log.
    pub log: ChatLog,
}

struct RegisteredSession {
    entry: Arc<tokio::sync::Mutex<SessionEntry>>,
    /// Logical timestamp of the last checkout; drives LRU eviction.
    last_active: u64,
}

/// Map from session id to live conversation state, bounded by capacity.
///
/// When a new session would exceed `max_sessions`, the least-recently-active
/// entry is evicted; an evicted id restarts as a fresh conversation on its
/// next request.
pub struct SessionRegistry {
    max_sessions: usize,
    inner: Mutex<RegistryInner>,
}

struct RegistryInner {
    sessions: HashMap<String, RegisteredSession>,
    clock: u64,
}

impl SessionRegistry {
    /// Create a registry holding at most `max_sessions` live sessions.
    #[must_use]
    pub fn new(max_sessions: usize) -> Self {
        Self {
            max_sessions: max_sessions.max(1),
            inner: Mutex::new(RegistryInner {
                sessions: HashMap::new(),
                clock: 0,
            }),
        }
    }

    /// Check out the state for `session_id`, creating it on first use.
    ///
    /// The returned handle stays valid after eviction; eviction only means
    /// the id maps to a fresh entry next time.
    pub fn checkout(&self, session_id: &str) -> Arc<tokio::sync::Mutex<SessionEntry>> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.clock += 1;
        let now = inner.clock;

        if let Some(registered) = inner.sessions.get_mut(session_id) {
            registered.last_active = now;
            return Arc::clone(&registered.entry);
        }

        if inner.sessions.len() >= self.max_sessions {
            let oldest = inner
                .sessions
                .iter()
                .min_by_key(|(_, s)| s.last_active)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                inner.sessions.remove(&id);
                info!("evicted least-recently-active session {id:?}");
            }
        }

        let entry = Arc::new(tokio::sync::Mutex::new(SessionEntry::default()));
        inner.sessions.insert(
            session_id.to_owned(),
            RegisteredSession {
                entry: Arc::clone(&entry),
                last_active: now,
            },
        );
        entry
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .sessions
            .len()
    }

    /// Check if no sessions are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
