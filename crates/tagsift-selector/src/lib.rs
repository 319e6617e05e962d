//! Tag selection and page command channel for tagsift
//!
//! This crate owns the user's tag selection, persists it, and drives the
//! filter engine of the current page over an asynchronous command channel.

mod link;
mod notice;
mod selector;
mod storage;

pub use link::{LinkError, PageLink};
pub use notice::{Notice, NoticeBoard};
pub use selector::{Selector, SelectorError};
pub use storage::{JsonFileStorage, MemoryStorage};

// Re-export types used in our public API
pub use tagsift_types::{Notification, SelectedTagSet, SelectorConfig, Storage, TagCatalog};
