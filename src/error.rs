//! Error types for the agent client and the chat widget.

use thiserror::Error;

/// Failure of a single exchange with the agent backend.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The request could not be sent or was rejected at the transport level
    /// (connection refused, DNS, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a status outside 200-299.
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text, for diagnostics.
        body: String,
    },

    /// The backend answered successfully but the body did not carry the
    /// expected `response`/`threadId` fields.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    /// The configured backend URL could not be joined with a route path.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The background request task ended without an outcome (it panicked or
    /// was cancelled).
    #[error("exchange task failed: {0}")]
    Task(String),
}

impl AgentError {
    /// Short, stable label used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(e) if e.is_timeout() => "timeout",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::MalformedResponse(_) => "malformed",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Task(_) => "task",
        }
    }

    /// Whether the widget should surface a fallback agent message for this
    /// failure instead of failing silently.
    #[must_use]
    pub fn has_fallback_reply(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }
}

/// Reasons a submission was refused. A refused submission leaves the widget
/// untouched: no message is appended, the draft is kept and nothing is sent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The draft is empty or whitespace only.
    #[error("draft is empty")]
    EmptyDraft,

    /// Another exchange is still waiting for the backend.
    #[error("a message is already being sent")]
    Busy,

    /// The conversation panel is collapsed.
    #[error("chat panel is closed")]
    Closed,

    /// There is no failed exchange to resend.
    #[error("nothing to retry")]
    NothingToRetry,
}

/// Result type alias for agent client operations.
pub type Result<T> = std::result::Result<T, AgentError>;
