use crate::indicator::Indicator;

/// Handle to one element of a document, valid for that document's lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// CSS-like element selection used by the log locator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Element name, e.g. `pre`
    Tag(&'static str),
    /// `[class*="..."]`
    ClassContains(&'static str),
    /// `[id*="..."]`
    IdContains(&'static str),
    /// `.name`
    Class(&'static str),
}

impl Strategy {
    /// Check an element's name, id and class attribute against this strategy
    pub fn matches(&self, tag: &str, id: Option<&str>, class: Option<&str>) -> bool {
        match self {
            Self::Tag(name) => tag.eq_ignore_ascii_case(name),
            Self::ClassContains(needle) => class.is_some_and(|c| c.contains(needle)),
            Self::IdContains(needle) => id.is_some_and(|i| i.contains(needle)),
            Self::Class(name) => class.is_some_and(|c| c.split_whitespace().any(|n| n == *name)),
        }
    }
}

/// What the filter engine needs from the displayed document.
///
/// The rendering side implements this; the engine never touches
/// presentation details beyond these calls.
pub trait LogDocument {
    /// Elements matching `strategy`, in document order
    fn query(&self, strategy: &Strategy) -> Vec<NodeId>;

    /// Displayable text: the value for input-like elements, text content otherwise
    fn display_text(&self, node: NodeId) -> Option<String>;

    /// Replace the displayable text; false if the node no longer exists
    fn replace_text(&mut self, node: NodeId, text: &str) -> bool;

    fn indicator(&self) -> Option<&Indicator>;

    fn install_indicator(&mut self, indicator: Indicator);

    /// Remove the indicator if present; returns whether one was removed
    fn remove_indicator(&mut self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_strategy_ignores_case() {
        assert!(Strategy::Tag("pre").matches("PRE", None, None));
        assert!(!Strategy::Tag("pre").matches("div", None, None));
    }

    #[test]
    fn test_attribute_substring_strategies() {
        assert!(Strategy::ClassContains("log").matches("div", None, Some("debug-logview wide")));
        assert!(!Strategy::ClassContains("log").matches("div", None, None));
        assert!(Strategy::IdContains("debug").matches("div", Some("apexdebugPanel"), None));
        assert!(!Strategy::IdContains("debug").matches("div", Some("main"), Some("debug")));
    }

    #[test]
    fn test_class_strategy_needs_whole_name() {
        let s = Strategy::Class("codeBlock");
        assert!(s.matches("div", None, Some("panel codeBlock")));
        assert!(!s.matches("div", None, Some("codeBlockWide")));
    }
}
