use tagsift_types::TagCatalog;
use tracing::debug;

use crate::document::{LogDocument, NodeId, Strategy};

/// Selection strategies, most specific first
pub const STRATEGIES: &[Strategy] = &[
    Strategy::Tag("pre"),
    Strategy::Tag("textarea"),
    Strategy::ClassContains("log"),
    Strategy::ClassContains("debug"),
    Strategy::IdContains("log"),
    Strategy::IdContains("debug"),
    Strategy::Class("codeBlock"),
    Strategy::Class("debugLog"),
];

/// Find the element holding the log.
///
/// Walks [`STRATEGIES`] in order and, within each, the matching elements in
/// document order; the first element whose text mentions any catalog tag wins.
/// Never cache the result: the node may not survive a reload.
pub fn locate<D: LogDocument + ?Sized>(document: &D, catalog: &TagCatalog) -> Option<NodeId> {
    for strategy in STRATEGIES {
        for node in document.query(strategy) {
            let Some(text) = document.display_text(node) else {
                continue;
            };
            if catalog.mentioned_in(&text) {
                debug!(?strategy, ?node, "located log surface");
                return Some(node);
            }
        }
    }

    None
}

/// Find the candidate element whose displayed text is exactly `text`.
///
/// Used to recover a surface after filtering, when its text may no longer
/// mention any catalog tag. Same walk order as [`locate`].
pub fn locate_showing<D: LogDocument + ?Sized>(document: &D, text: &str) -> Option<NodeId> {
    if text.is_empty() {
        return None;
    }
    STRATEGIES.iter().find_map(|strategy| {
        document
            .query(strategy)
            .into_iter()
            .find(|&node| document.display_text(node).as_deref() == Some(text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Element, Page};

    #[test]
    fn test_second_candidate_wins_when_first_has_no_tag() {
        let mut page = Page::new();
        page.push(Element::new("pre").with_text("just some code"));
        let second = page.push(Element::new("pre").with_text("12:00|USER_DEBUG|hi"));

        assert_eq!(locate(&page, &TagCatalog::full()), Some(second));
    }

    #[test]
    fn test_strategy_order_beats_document_order() {
        let mut page = Page::new();
        page.push(
            Element::new("div")
                .with_class("debugLog")
                .with_text("METHOD_ENTRY"),
        );
        let textarea = page.push(Element::new("textarea").with_text("METHOD_EXIT"));

        assert_eq!(locate(&page, &TagCatalog::full()), Some(textarea));
    }

    #[test]
    fn test_attribute_strategies() {
        let mut page = Page::new();
        page.push(Element::new("div").with_id("main").with_text("DML_BEGIN"));
        let by_id = page.push(Element::new("div").with_id("apex_log_view").with_text("DML_BEGIN"));
        assert_eq!(locate(&page, &TagCatalog::full()), Some(by_id));
    }

    #[test]
    fn test_not_found() {
        let mut page = Page::new();
        page.push(Element::new("pre").with_text("no markers"));
        page.push(Element::new("div").with_class("log").with_text("still none"));
        assert_eq!(locate(&page, &TagCatalog::full()), None);
        assert_eq!(locate(&Page::new(), &TagCatalog::full()), None);
    }

    #[test]
    fn test_minimal_catalog_narrows_detection() {
        let mut page = Page::new();
        let pre = page.push(Element::new("pre").with_text("12:00|HEAP_ALLOCATE|x"));

        assert_eq!(locate(&page, &TagCatalog::full()), Some(pre));
        assert_eq!(locate(&page, &TagCatalog::minimal()), None);
    }

    #[test]
    fn test_textarea_detected_by_value() {
        let mut page = Page::new();
        let mut area = Element::new("textarea").with_text("nothing");
        area.value = Some("USER_DEBUG typed in".to_string());
        let node = page.push(area);
        assert_eq!(locate(&page, &TagCatalog::full()), Some(node));
    }

    #[test]
    fn test_parsed_html() {
        let page = Page::parse_html(
            r#"<html><body>
                <pre>console.log('hi')</pre>
                <div class="logContainer"><span>12:00|USER_DEBUG|x</span></div>
            </body></html>"#,
        );
        let node = locate(&page, &TagCatalog::full()).unwrap();
        assert_eq!(page.element(node).unwrap().tag, "div");
    }

    #[test]
    fn test_locate_showing_matches_exact_text() {
        let mut page = Page::new();
        page.push(Element::new("div").with_class("logHelp").with_text("see METHOD_ENTRY docs"));
        let pre = page.push(Element::new("pre").with_text("custom-marker b"));

        assert_eq!(locate_showing(&page, "custom-marker b"), Some(pre));
        assert_eq!(locate_showing(&page, "custom-marker"), None);
        assert_eq!(locate_showing(&page, ""), None);
    }
}
