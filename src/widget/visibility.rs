//! Launcher / panel visibility.

/// Collapsed launcher vs expanded conversation panel.
#[derive(Debug, Default, Clone, Copy)]
pub struct VisibilityController {
    is_open: bool,
}

impl VisibilityController {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Flip the panel and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.is_open = !self.is_open;
        self.is_open
    }
}
