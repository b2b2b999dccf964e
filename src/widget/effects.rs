//! Presentation side effects driven by conversation changes.

use super::Message;

/// Whatever renders the conversation panel's end marker.
pub trait ScrollAnchor: Send {
    /// Bring the newest message into view.
    fn scroll_to_end(&mut self, messages: &[Message]);
}

/// Anchor for hosts without a scrollable view.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoScroll;

impl ScrollAnchor for NoScroll {
    fn scroll_to_end(&mut self, _messages: &[Message]) {}
}

/// Scrolls the panel to its end whenever the history length changes.
pub struct Autoscroll {
    anchor: Box<dyn ScrollAnchor>,
    seen: usize,
}

impl std::fmt::Debug for Autoscroll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autoscroll").field("seen", &self.seen).finish()
    }
}

impl Autoscroll {
    #[must_use]
    pub fn new(anchor: Box<dyn ScrollAnchor>) -> Self {
        Self { anchor, seen: 0 }
    }

    /// Run after every mutation of the history.
    pub fn after_change(&mut self, messages: &[Message]) {
        if messages.len() != self.seen {
            self.seen = messages.len();
            self.anchor.scroll_to_end(messages);
        }
    }
}
