//! Shared types for tagsift
//!
//! This crate contains the tag catalog, the user's tag selection, the wire
//! protocol spoken between the selector and the filter engine, and the error
//! kinds and configuration used on both sides.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::oneshot;

// ============================================================================
// Tag Catalog
// ============================================================================

/// Every event marker a Salesforce debug log line can carry, in display order
pub const FULL_CATALOG: &[&str] = &[
    "CODE_UNIT_STARTED",
    "CODE_UNIT_FINISHED",
    "METHOD_ENTRY",
    "METHOD_EXIT",
    "CONSTRUCTOR_ENTRY",
    "CONSTRUCTOR_EXIT",
    "SYSTEM_METHOD_ENTRY",
    "SYSTEM_METHOD_EXIT",
    "SYSTEM_CONSTRUCTOR_ENTRY",
    "SYSTEM_CONSTRUCTOR_EXIT",
    "STATEMENT_EXECUTE",
    "VARIABLE_SCOPE_BEGIN",
    "VARIABLE_ASSIGNMENT",
    "USER_DEBUG",
    "USER_INFO",
    "SYSTEM_MODE_ENTER",
    "SYSTEM_MODE_EXIT",
    "DML_BEGIN",
    "DML_END",
    "SOQL_EXECUTE_BEGIN",
    "SOQL_EXECUTE_END",
    "SOSL_EXECUTE_BEGIN",
    "SOSL_EXECUTE_END",
    "EXCEPTION_THROWN",
    "FATAL_ERROR",
    "FLOW_CREATE_INTERVIEW_BEGIN",
    "FLOW_CREATE_INTERVIEW_END",
    "FLOW_START_INTERVIEWS_BEGIN",
    "FLOW_START_INTERVIEWS_END",
    "FLOW_ELEMENT_BEGIN",
    "FLOW_ELEMENT_END",
    "VALIDATION_RULE",
    "VALIDATION_FORMULA",
    "VALIDATION_PASS",
    "VALIDATION_FAIL",
    "CALLOUT_REQUEST",
    "CALLOUT_RESPONSE",
    "LIMIT_USAGE",
    "HEAP_ALLOCATE",
    "EXECUTION_STARTED",
    "EXECUTION_FINISHED",
    "WF_RULE_EVAL_BEGIN",
    "WF_RULE_EVAL_END",
    "WF_CRITERIA_BEGIN",
    "WF_CRITERIA_END",
    "WF_ACTION",
    "WF_ACTIONS_END",
    "ENTERING_MANAGED_PKG",
    "CUMULATIVE_LIMIT_USAGE",
    "CUMULATIVE_LIMIT_USAGE_END",
    "EMAIL_QUEUE",
    "PUSH_NOTIFICATION_SENT",
    "VF_APEX_CALL_START",
    "VF_APEX_CALL_END",
    "VF_DESERIALIZE_VIEWSTATE_BEGIN",
    "VF_DESERIALIZE_VIEWSTATE_END",
    "VF_EVALUATE_FORMULA_BEGIN",
    "VF_EVALUATE_FORMULA_END",
    "VF_PAGE_MESSAGE",
    "VF_SERIALIZE_VIEWSTATE_BEGIN",
    "VF_SERIALIZE_VIEWSTATE_END",
];

/// Narrow detection list used by the lightweight engine variant
pub const MINIMAL_CATALOG: &[&str] = &[
    "CODE_UNIT_STARTED",
    "METHOD_ENTRY",
    "USER_DEBUG",
    "SOQL_EXECUTE_BEGIN",
    "DML_BEGIN",
    "EXECUTION_STARTED",
];

/// Which built-in catalog to use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogChoice {
    #[default]
    Full,
    Minimal,
}

impl CatalogChoice {
    pub fn catalog(&self) -> TagCatalog {
        match self {
            Self::Full => TagCatalog::full(),
            Self::Minimal => TagCatalog::minimal(),
        }
    }
}

/// Ordered, read-only list of known tag identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagCatalog {
    tags: &'static [&'static str],
}

impl TagCatalog {
    pub fn full() -> Self {
        Self { tags: FULL_CATALOG }
    }

    pub fn minimal() -> Self {
        Self { tags: MINIMAL_CATALOG }
    }

    pub fn tags(&self) -> &'static [&'static str] {
        self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Whether any catalog tag occurs in `text` as a literal substring
    pub fn mentioned_in(&self, text: &str) -> bool {
        self.tags.iter().any(|tag| text.contains(tag))
    }

    /// Tags whose name contains `term`, ignoring case, in catalog order
    pub fn search(&self, term: &str) -> Vec<&'static str> {
        let term = term.to_lowercase();
        self.tags
            .iter()
            .copied()
            .filter(|tag| tag.to_lowercase().contains(&term))
            .collect()
    }
}

impl Default for TagCatalog {
    fn default() -> Self {
        Self::full()
    }
}

// ============================================================================
// Selection
// ============================================================================

/// The tags a user wants to keep.
///
/// Membership is a set, but iteration follows insertion order so the
/// persisted sequence replays the way it was chosen. Tags are not checked
/// against any catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectedTagSet {
    tags: Vec<String>,
}

impl SelectedTagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted sequence, dropping repeats
    pub fn from_persisted<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for tag in tags {
            set.insert(tag);
        }
        set
    }

    /// Add a tag; returns false if it was already selected
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Remove a tag; returns false if it was not selected
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add every catalog tag not yet selected, in catalog order
    pub fn select_all(&mut self, catalog: &TagCatalog) {
        for tag in catalog.tags() {
            self.insert(*tag);
        }
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Sequence in insertion order, as persisted and sent over the wire
    pub fn to_vec(&self) -> Vec<String> {
        self.tags.clone()
    }
}

// ============================================================================
// Protocol
// ============================================================================

/// Storage key holding the last applied selection
pub const SELECTED_TAGS_KEY: &str = "selectedTags";

/// Text sent with a `noFilteredContent` notification
pub const NO_FILTERED_CONTENT_MESSAGE: &str = "No log lines match the selected tags.";

/// Text shown when a notification arrives without a message
pub const NO_FILTERED_CONTENT_FALLBACK: &str = "No matching log lines found.";

/// Commands from the selector to the filter engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    ApplyFilter { tags: Vec<String> },
    ClearFilter,
    DownloadFiltered,
}

impl Command {
    /// Wire name of the command
    pub fn action(&self) -> &'static str {
        match self {
            Self::ApplyFilter { .. } => "applyFilter",
            Self::ClearFilter => "clearFilter",
            Self::DownloadFiltered => "downloadFiltered",
        }
    }
}

/// Reply to a command
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Unsolicited messages from the filter engine to the selector
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Notification {
    NoFilteredContent {
        #[serde(default)]
        message: Option<String>,
    },
}

impl Notification {
    pub fn no_filtered_content() -> Self {
        Self::NoFilteredContent {
            message: Some(NO_FILTERED_CONTENT_MESSAGE.to_string()),
        }
    }
}

/// Selector's answer to a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub acknowledged: bool,
}

/// A command in flight, carrying the slot its reply goes back through
#[derive(Debug)]
pub struct Envelope {
    pub command: Command,
    pub reply: oneshot::Sender<Reply>,
}

impl Envelope {
    pub fn new(command: Command) -> (Self, oneshot::Receiver<Reply>) {
        let (reply, rx) = oneshot::channel();
        (Self { command, reply }, rx)
    }
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable key-value store shared by the selector and the engine
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError>;
}

/// Read the persisted selection; anything unreadable counts as no selection
pub fn load_selected_tags(storage: &dyn Storage) -> Result<Option<Vec<String>>, StorageError> {
    let Some(value) = storage.get(SELECTED_TAGS_KEY)? else {
        return Ok(None);
    };
    Ok(serde_json::from_value(value).ok())
}

pub fn save_selected_tags(storage: &dyn Storage, tags: &[String]) -> Result<(), StorageError> {
    storage.set(SELECTED_TAGS_KEY, serde_json::to_value(tags)?)
}

// ============================================================================
// Errors
// ============================================================================

/// Recoverable failures of a filtering operation
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("No log element found on this page")]
    SurfaceNotFound,

    #[error("Please select at least one tag")]
    EmptySelection,

    #[error("No log lines match the selected tags.")]
    NoLinesMatched,

    #[error("No filtered log to download. Please apply a filter first.")]
    ExportWithoutActiveFilter,
}

// ============================================================================
// Configuration
// ============================================================================

/// What the engine does when a filter keeps zero lines
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyResultPolicy {
    #[default]
    Notify,
    Silent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Catalog used to recognise the log surface
    pub catalog: CatalogChoice,

    pub on_empty_result: EmptyResultPolicy,

    /// Delay before replaying a persisted selection on page load
    pub replay_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogChoice::Full,
            on_empty_result: EmptyResultPolicy::Notify,
            replay_delay_ms: 1000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// How long a notice stays visible
    pub notice_ms: u64,

    /// Location of the persisted selection (None = platform default)
    pub storage_path: Option<PathBuf>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            notice_ms: 3000,
            storage_path: None,
        }
    }
}
