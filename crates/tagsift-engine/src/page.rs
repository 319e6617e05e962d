use scraper::{ElementRef, Html};

use crate::document::{LogDocument, NodeId, Strategy};
use crate::indicator::Indicator;

/// One element of a page
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Lowercase element name
    pub tag: String,

    pub id: Option<String>,

    /// Raw class attribute
    pub class: Option<String>,

    /// Text content, including descendants
    pub text: String,

    /// Current value of input-like elements
    pub value: Option<String>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    /// Set the text; input-like elements also take it as their value
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        if self.is_input_like() {
            self.value = Some(text.to_string());
        }
        self
    }

    /// Textareas and inputs display their value rather than their text
    pub fn is_input_like(&self) -> bool {
        matches!(self.tag.as_str(), "textarea" | "input")
    }

    pub fn display_text(&self) -> &str {
        if self.is_input_like() {
            self.value.as_deref().unwrap_or_default()
        } else {
            &self.text
        }
    }

    fn set_display_text(&mut self, text: &str) {
        if self.is_input_like() {
            self.value = Some(text.to_string());
        } else {
            self.text = text.to_string();
        }
    }
}

/// In-memory document: elements in document order plus the overlay slot
#[derive(Clone, Debug, Default)]
pub struct Page {
    elements: Vec<Element>,
    indicator: Option<Indicator>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            elements,
            indicator: None,
        }
    }

    /// Build a page from HTML, flattening every element in document order
    pub fn parse_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut page = Self::new();

        for node in document.root_element().descendants() {
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };
            let value = element.value();
            let text: String = element.text().collect();

            let mut parsed = Element::new(value.name());
            parsed.id = value.attr("id").map(str::to_string);
            parsed.class = value.attr("class").map(str::to_string);
            parsed.value = match parsed.tag.as_str() {
                "textarea" => Some(text.clone()),
                "input" => Some(value.attr("value").unwrap_or_default().to_string()),
                _ => None,
            };
            parsed.text = text;
            page.push(parsed);
        }

        page
    }

    pub fn push(&mut self, element: Element) -> NodeId {
        self.elements.push(element);
        NodeId(self.elements.len() - 1)
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node.0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl LogDocument for Page {
    fn query(&self, strategy: &Strategy) -> Vec<NodeId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| strategy.matches(&e.tag, e.id.as_deref(), e.class.as_deref()))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    fn display_text(&self, node: NodeId) -> Option<String> {
        self.element(node).map(|e| e.display_text().to_string())
    }

    fn replace_text(&mut self, node: NodeId, text: &str) -> bool {
        match self.elements.get_mut(node.0) {
            Some(element) => {
                element.set_display_text(text);
                true
            }
            None => false,
        }
    }

    fn indicator(&self) -> Option<&Indicator> {
        self.indicator.as_ref()
    }

    fn install_indicator(&mut self, indicator: Indicator) {
        self.indicator = Some(indicator);
    }

    fn remove_indicator(&mut self) -> bool {
        self.indicator.take().is_some()
    }
}
