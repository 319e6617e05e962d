/// Filtering state for one document lifetime.
///
/// Created fresh for every page load. The original text is captured once and
/// never overwritten afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSession {
    original: Option<String>,
    filtered: String,
    /// Text last written into the surface while a filter is active
    displayed: Option<String>,
    active: bool,
}

impl FilterSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` as the unfiltered baseline unless one is already held.
    /// Returns true if this call captured it.
    pub fn capture(&mut self, text: impl Into<String>) -> bool {
        if self.is_captured() {
            return false;
        }
        self.original = Some(text.into());
        true
    }

    /// An empty capture counts as nothing captured
    pub fn is_captured(&self) -> bool {
        self.original.as_deref().is_some_and(|o| !o.is_empty())
    }

    pub fn original(&self) -> Option<&str> {
        self.original.as_deref().filter(|o| !o.is_empty())
    }

    pub fn filtered(&self) -> &str {
        &self.filtered
    }

    /// Record a non-empty filter result now on display
    pub fn show_filtered(&mut self, filtered: String) {
        self.displayed = Some(filtered.clone());
        self.filtered = filtered;
        self.active = true;
    }

    /// Record a filter result with no lines. The display keeps whatever it
    /// showed before, but there is nothing left to export.
    pub fn record_empty_result(&mut self) {
        self.filtered.clear();
    }

    pub fn deactivate(&mut self) {
        self.displayed = None;
        self.active = false;
    }

    /// Text the surface should currently show: the last filtered result while
    /// active, the original otherwise
    pub fn displayed(&self) -> Option<&str> {
        match &self.displayed {
            Some(text) if self.active => Some(text),
            _ => self.original(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Filtered text available for export, if any
    pub fn exportable(&self) -> Option<&str> {
        (self.active && !self.filtered.is_empty()).then_some(self.filtered.as_str())
    }
}
