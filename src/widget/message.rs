//! Chat turns.

use serde::{Deserialize, Serialize};

use crate::agent::ThreadId;

/// One chat turn.
///
/// Messages are immutable once built; the conversation store only appends
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    text: String,
    is_agent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thread_id: Option<ThreadId>,
}

impl Message {
    /// A turn typed by the local user.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_agent: false,
            thread_id: None,
        }
    }

    /// A turn produced by the backend on `thread_id`.
    #[must_use]
    pub fn agent(text: impl Into<String>, thread_id: ThreadId) -> Self {
        Self {
            text: text.into(),
            is_agent: true,
            thread_id: Some(thread_id),
        }
    }

    /// An agent-side turn generated locally (greeting, fallback reply).
    #[must_use]
    pub fn local_agent(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_agent: true,
            thread_id: None,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_agent(&self) -> bool {
        self.is_agent
    }

    /// Continuation token carried by backend replies.
    #[must_use]
    pub fn thread_id(&self) -> Option<&ThreadId> {
        self.thread_id.as_ref()
    }
}
