/// Line filter keyed on literal tag substrings
#[derive(Clone, Debug, Default)]
pub struct TagFilter {
    /// Tags to keep (empty = keep everything)
    tags: Vec<String>,
}

impl TagFilter {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a line carries at least one of the tags.
    /// Matching is case-sensitive and unanchored.
    pub fn matches(&self, line: &str) -> bool {
        self.tags.iter().any(|tag| line.contains(tag.as_str()))
    }

    /// Check if filter is empty (keeps everything)
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Keep the lines of `text` that match, joined with `\n`
    pub fn apply(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }

        text.split('\n')
            .filter(|line| self.matches(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Keep only the lines of `text` containing at least one of `tags`.
///
/// An empty tag list returns the text unchanged.
pub fn filter_by_tags<S: AsRef<str>>(text: &str, tags: &[S]) -> String {
    TagFilter::new(tags.iter().map(|t| t.as_ref().to_string())).apply(text)
}
