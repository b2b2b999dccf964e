//! Append-only conversation state.

use super::Message;
use crate::agent::{Route, ThreadId};

/// Ordered message history plus the backend continuation token.
///
/// Insertion order is chronological order. Entries are never edited,
/// reordered or removed.
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    thread_id: Option<ThreadId>,
}

impl ConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the history.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append to the tail. The only mutation of the history.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// `None` until the first successful exchange.
    #[must_use]
    pub fn thread_id(&self) -> Option<&ThreadId> {
        self.thread_id.as_ref()
    }

    /// Replace the continuation token. The backend is authoritative, so
    /// this always overwrites.
    pub fn set_thread_id(&mut self, id: ThreadId) {
        self.thread_id = Some(id);
    }

    /// Endpoint the next submission should be sent to.
    #[must_use]
    pub fn route(&self) -> Route {
        Route::for_thread(self.thread_id.as_ref())
    }
}
