use std::time::{Duration, Instant};

/// An error-styled message shown to the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    shown_at: Instant,
}

/// Single auto-dismissing notice slot.
///
/// Showing a notice replaces the current one and restarts the visibility
/// window; notices never stack.
#[derive(Clone, Debug)]
pub struct NoticeBoard {
    current: Option<Notice>,
    visible_for: Duration,
}

impl NoticeBoard {
    pub fn new(visible_for: Duration) -> Self {
        Self {
            current: None,
            visible_for,
        }
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.show_at(message, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, now: Instant) {
        self.current = Some(Notice {
            message: message.into(),
            shown_at: now,
        });
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    /// The notice still visible at `now`, if any
    pub fn current_at(&self, now: Instant) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.shown_at) < self.visible_for)
    }

    /// Drop an expired notice; returns true if one was hidden
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if self.current.is_some() && self.current_at(now).is_none() {
            self.current = None;
            return true;
        }
        false
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn visible_for(&self) -> Duration {
        self.visible_for
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_hides_after_window() {
        let mut board = NoticeBoard::default();
        let t0 = Instant::now();
        board.show_at("No active tab found", t0);

        assert!(board.current_at(t0 + Duration::from_millis(2999)).is_some());
        assert!(board.current_at(t0 + Duration::from_millis(3000)).is_none());

        assert!(!board.tick_at(t0 + Duration::from_millis(10)));
        assert!(board.tick_at(t0 + Duration::from_secs(4)));
        assert!(board.current_at(t0).is_none());
    }

    #[test]
    fn test_dismiss() {
        let mut board = NoticeBoard::default();
        board.show("Please select at least one tag");
        assert!(board.current().is_some());
        board.dismiss();
        assert!(board.current().is_none());
    }

    #[test]
    fn test_new_notice_replaces_and_restarts_window() {
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        let t0 = Instant::now();
        board.show_at("first", t0);
        board.show_at("second", t0 + Duration::from_secs(2));

        let at = t0 + Duration::from_secs(4);
        assert_eq!(board.current_at(at).unwrap().message, "second");
    }
}
