//! Solace: a conversational companion service.
//!
//! A JSON HTTP API wraps two pretrained model delegates — dialogue
//! generation and emotion classification — behind per-session conversation
//! state, with a keyword override table for configured trigger words and a
//! terminal dashboard client.
//!
//! # Architecture
//!
//! One `/chat` turn flows through independent parts:
//! - **Keyword table**: configured trigger words short-circuit generation
//!   with a canned response plus helpline
//! - **Session**: encoded turn history, bounded and carried between turns
//! - **Dialogue delegate**: opaque HTTP service continuing a token sequence
//! - **Emotion delegate**: opaque HTTP service ranking emotion labels
//! - **Chat log**: append-only record of completed turns, cleared on reset
//!
//! The dashboard client keeps its own transcript and emotion history, and
//! stays usable when the backend is unreachable.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod keywords;
pub mod model;
pub mod registry;
pub mod responder;
pub mod server;
pub mod session;
pub mod transcript;

pub use config::AppConfig;
pub use error::{Result, SolaceError};
