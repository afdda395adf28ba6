//! Error types for the solace service.
//!
//! All errors carry stable string messages suitable for display to users
//! and for mapping to HTTP status codes at the API surface. A delegate
//! failure is never converted into a plausible-looking reply.

/// Top-level error type for the companion service.
#[derive(Debug, thiserror::Error)]
pub enum SolaceError {
    /// The request was rejected before any delegate was invoked.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The dialogue-generation delegate failed or returned a malformed result.
    #[error("generation error: {0}")]
    Generation(String),

    /// The emotion-classification delegate failed or returned a malformed result.
    #[error("classification error: {0}")]
    Classification(String),

    /// A delegate call exceeded its configured time bound.
    #[error("delegate timed out: {0}")]
    Timeout(String),

    /// Turn encoding or decoding failed.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Client-side transport failure (dashboard cannot reach the API).
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, SolaceError>;
