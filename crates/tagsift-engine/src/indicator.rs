/// Element id of the overlay
pub const INDICATOR_ID: &str = "sf-log-filter-indicator";

/// Element id of the overlay's clear button
pub const CLEAR_BUTTON_ID: &str = "sf-clear-filter";

/// Overlay shown while the log displays filtered content
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Indicator {
    pub tag_count: usize,
}

impl Indicator {
    pub fn new(tag_count: usize) -> Self {
        Self { tag_count }
    }

    pub fn label(&self) -> String {
        format!("Filter Active ({} tags)", self.tag_count)
    }
}

/// Events raised by page elements the engine owns
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageEvent {
    /// The indicator's "Clear" button was pressed
    IndicatorClearPressed,
}
