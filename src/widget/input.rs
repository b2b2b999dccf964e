//! Draft text handling.

/// Holds the unsent draft and gates submission on it.
#[derive(Debug, Default, Clone)]
pub struct InputController {
    draft: String,
}

impl InputController {
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft. Intermediate keystrokes are not validated.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Whether the submit action should be enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    /// Take the draft for sending, leaving it empty.
    ///
    /// Returns `None` and keeps the draft untouched when it is blank. The
    /// text is submitted as typed, without trimming.
    pub fn take_submission(&mut self) -> Option<String> {
        self.can_submit().then(|| std::mem::take(&mut self.draft))
    }
}
