//! Log locating and tag filtering for tagsift
//!
//! This crate finds the log-bearing element of a page, filters it down to the
//! lines carrying selected tags, restores it, and exports the filtered text.

mod document;
mod engine;
mod export;
mod filter;
mod host;
mod indicator;
mod locator;
mod page;
mod session;

pub use document::{LogDocument, NodeId, Strategy};
pub use engine::{ApplyOutcome, EngineError, FilterEngine, Handled};
pub use export::{DirectorySink, DownloadSink, ExportArtifact, ExportError, RecordingSink};
pub use filter::{TagFilter, filter_by_tags};
pub use host::{EngineHost, ReplayPlan};
pub use indicator::{CLEAR_BUTTON_ID, INDICATOR_ID, Indicator, PageEvent};
pub use locator::{STRATEGIES, locate, locate_showing};
pub use page::{Element, Page};
pub use session::FilterSession;

// Re-export types used in our public API
pub use tagsift_types::{Command, EngineConfig, Notification, Reply, TagCatalog};
