use tagsift_types::{
    Command, EmptyResultPolicy, EngineConfig, FilterError, Notification, Reply, TagCatalog,
};
use tracing::{debug, info, warn};

use crate::document::{LogDocument, NodeId};
use crate::export::{DownloadSink, ExportArtifact, ExportError};
use crate::filter::filter_by_tags;
use crate::indicator::{Indicator, PageEvent};
use crate::locator::{locate, locate_showing};
use crate::session::FilterSession;

/// Result of an apply request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The surface now shows `kept_lines` lines
    Applied { kept_lines: usize },
    /// Nothing matched; the surface was left alone
    NoMatch,
    SurfaceNotFound,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Download failed: {0}")]
    Export(#[from] ExportError),
}

/// What the engine sends back after processing a command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Handled {
    pub reply: Reply,
    pub notification: Option<Notification>,
}

/// Applies and reverts tag filtering on one document.
///
/// Owns the document, the download sink and the per-load [`FilterSession`].
pub struct FilterEngine<D, S> {
    document: D,
    sink: S,
    catalog: TagCatalog,
    on_empty_result: EmptyResultPolicy,
    session: FilterSession,
}

impl<D: LogDocument, S: DownloadSink> FilterEngine<D, S> {
    pub fn new(document: D, sink: S, config: &EngineConfig) -> Self {
        Self {
            document,
            sink,
            catalog: config.catalog.catalog(),
            on_empty_result: config.on_empty_result,
            session: FilterSession::new(),
        }
    }

    /// Filter the surface down to lines carrying any of `tags`.
    ///
    /// Always filters from the text captured on the first call, never from a
    /// previous result.
    pub fn apply_filter<T: AsRef<str>>(&mut self, tags: &[T]) -> ApplyOutcome {
        let Some(node) = self.surface() else {
            warn!("No log element found on this page");
            return ApplyOutcome::SurfaceNotFound;
        };

        if !self.session.is_captured() {
            let text = self.document.display_text(node).unwrap_or_default();
            debug!(bytes = text.len(), "captured original log content");
            self.session.capture(text);
        }

        let original = self.session.original().unwrap_or_default();
        let filtered = filter_by_tags(original, tags);
        if filtered.is_empty() {
            debug!(tags = tags.len(), "no log lines matched");
            self.session.record_empty_result();
            return ApplyOutcome::NoMatch;
        }

        let kept_lines = filtered.split('\n').count();
        self.document.replace_text(node, &filtered);
        self.session.show_filtered(filtered);

        self.document.remove_indicator();
        self.document.install_indicator(Indicator::new(tags.len()));

        info!(tags = tags.len(), kept_lines, "filter applied");
        ApplyOutcome::Applied { kept_lines }
    }

    /// Restore the captured text and drop the indicator.
    ///
    /// Returns whether content was restored. The indicator goes away even
    /// when the surface cannot be found.
    pub fn clear_filter(&mut self) -> bool {
        let mut restored = false;
        match self.surface() {
            Some(node) => {
                if let Some(original) = self.session.original() {
                    restored = self.document.replace_text(node, original);
                }
            }
            None => warn!("No log element found on this page"),
        }

        self.session.deactivate();
        self.document.remove_indicator();

        info!(restored, "filter cleared");
        restored
    }

    /// Hand the current filtered text to the download sink
    pub fn download_filtered(&mut self) -> Result<ExportArtifact, EngineError> {
        let content = self
            .session
            .exportable()
            .ok_or(FilterError::ExportWithoutActiveFilter)?;

        let artifact = ExportArtifact::now(content);
        self.sink.save(&artifact)?;

        info!(filename = %artifact.filename, "filtered log downloaded");
        Ok(artifact)
    }

    /// Run one command, producing the reply and any notification.
    /// Failures are encoded in the reply, never raised.
    pub fn handle(&mut self, command: Command) -> Handled {
        debug!(action = command.action(), "handling command");

        match command {
            Command::ApplyFilter { tags } => {
                let notification = self.apply_and_notify(tags.as_slice());
                Handled {
                    reply: Reply::ok(),
                    notification,
                }
            }
            Command::ClearFilter => {
                self.clear_filter();
                Handled {
                    reply: Reply::ok(),
                    notification: None,
                }
            }
            Command::DownloadFiltered => {
                let reply = match self.download_filtered() {
                    Ok(_) => Reply::ok(),
                    Err(e) => {
                        warn!(error = %e, "download rejected");
                        Reply::failed(e)
                    }
                };
                Handled {
                    reply,
                    notification: None,
                }
            }
        }
    }

    /// Re-apply a persisted selection after page load.
    ///
    /// Silently skipped when the page no longer holds a log.
    pub fn replay(&mut self, tags: &[String]) -> Option<Notification> {
        if self.surface().is_none() {
            debug!("no log surface at replay time, skipping");
            return None;
        }
        self.apply_and_notify(tags)
    }

    pub fn handle_page_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::IndicatorClearPressed => {
                if self.document.indicator().is_some() {
                    self.clear_filter();
                } else {
                    debug!("clear pressed without an indicator, ignoring");
                }
            }
        }
    }

    /// Start over on a freshly loaded document
    pub fn navigate(&mut self, document: D) {
        self.document = document;
        self.session = FilterSession::new();
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn session(&self) -> &FilterSession {
        &self.session
    }

    pub fn is_filter_active(&self) -> bool {
        self.session.is_active()
    }

    /// Locate the surface afresh. Once text has been captured, the element
    /// showing what the engine last put on display wins over the catalog scan.
    pub fn surface(&self) -> Option<NodeId> {
        self.session
            .displayed()
            .and_then(|text| locate_showing(&self.document, text))
            .or_else(|| locate(&self.document, &self.catalog))
    }

    fn apply_and_notify<T: AsRef<str>>(&mut self, tags: &[T]) -> Option<Notification> {
        match self.apply_filter(tags) {
            ApplyOutcome::NoMatch => match self.on_empty_result {
                EmptyResultPolicy::Notify => Some(Notification::no_filtered_content()),
                EmptyResultPolicy::Silent => None,
            },
            _ => None,
        }
    }
}
