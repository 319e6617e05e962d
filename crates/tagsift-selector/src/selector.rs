use std::time::Duration;

use tagsift_types::{
    Acknowledgement, Command, FilterError, NO_FILTERED_CONTENT_FALLBACK, Notification, Reply,
    SelectedTagSet, SelectorConfig, Storage, TagCatalog, load_selected_tags,
    save_selected_tags,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::link::{LinkError, PageLink};
use crate::notice::NoticeBoard;

#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Link(#[from] LinkError),

    /// The engine answered with a failure
    #[error("{0}")]
    Rejected(String),
}

/// Owns the user's tag selection and turns user intents into commands.
///
/// Every user-visible message is produced here: transient notices for
/// rejected input, delivery problems and empty results, and a blocking alert
/// when the engine refuses a command.
pub struct Selector<S> {
    catalog: TagCatalog,
    selected: SelectedTagSet,
    search: String,
    storage: S,
    link: Option<PageLink>,
    notifications: Option<mpsc::UnboundedReceiver<Notification>>,
    notices: NoticeBoard,
    alert: Option<String>,
}

impl<S: Storage> Selector<S> {
    /// Start with the selection persisted by the last apply
    pub fn start(catalog: TagCatalog, storage: S, config: &SelectorConfig) -> Self {
        let selected = match load_selected_tags(&storage) {
            Ok(Some(tags)) => SelectedTagSet::from_persisted(tags),
            Ok(None) => SelectedTagSet::new(),
            Err(e) => {
                warn!(error = %e, "could not read persisted selection");
                SelectedTagSet::new()
            }
        };
        debug!(selected = selected.len(), "selector started");

        Self {
            catalog,
            selected,
            search: String::new(),
            storage,
            link: None,
            notifications: None,
            notices: NoticeBoard::new(Duration::from_millis(config.notice_ms)),
            alert: None,
        }
    }

    /// Attach to the page currently in front
    pub fn with_link(mut self, link: PageLink) -> Self {
        self.link = Some(link);
        self
    }

    /// Receive unsolicited messages from the engine
    pub fn with_notifications(mut self, rx: mpsc::UnboundedReceiver<Notification>) -> Self {
        self.notifications = Some(rx);
        self
    }

    pub fn set_link(&mut self, link: Option<PageLink>) {
        self.link = link;
    }

    // Selection

    /// Checkbox change for one tag
    pub fn toggle(&mut self, tag: &str, checked: bool) {
        if checked {
            self.selected.insert(tag);
        } else {
            self.selected.remove(tag);
        }
    }

    pub fn select_all(&mut self) {
        self.selected.select_all(&self.catalog);
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, tag: &str) -> bool {
        self.selected.contains(tag)
    }

    pub fn selected(&self) -> &SelectedTagSet {
        &self.selected
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Narrow the displayed catalog; the selection is untouched
    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    /// Catalog entries currently listed
    pub fn visible_tags(&self) -> Vec<&'static str> {
        self.catalog.search(&self.search)
    }

    pub fn catalog(&self) -> &TagCatalog {
        &self.catalog
    }

    // Commands

    /// Persist the selection and ask the page to filter by it
    pub async fn apply(&mut self) -> Result<Reply, SelectorError> {
        if self.selected.is_empty() {
            return Err(self.report(FilterError::EmptySelection.into()));
        }

        let tags = self.selected.to_vec();
        if let Err(e) = save_selected_tags(&self.storage, &tags) {
            warn!(error = %e, "could not persist selection");
        }

        info!(tags = tags.len(), "applying filter");
        self.send(Command::ApplyFilter { tags }).await
    }

    pub async fn clear(&mut self) -> Result<Reply, SelectorError> {
        self.send(Command::ClearFilter).await
    }

    pub async fn download(&mut self) -> Result<Reply, SelectorError> {
        self.send(Command::DownloadFiltered).await
    }

    async fn send(&mut self, command: Command) -> Result<Reply, SelectorError> {
        let Some(link) = self.link.as_ref() else {
            return Err(self.report(LinkError::NoActiveTab.into()));
        };

        let action = command.action();
        let result = link.send(command).await;
        self.drain_notifications();

        match result {
            Ok(reply) if reply.success => Ok(reply),
            Ok(reply) => {
                let message = reply
                    .error
                    .unwrap_or_else(|| format!("{} failed", action));
                warn!(action, %message, "page rejected command");
                self.alert = Some(message.clone());
                Err(SelectorError::Rejected(message))
            }
            Err(e) => {
                warn!(action, error = %e, "command not delivered");
                Err(self.report(e.into()))
            }
        }
    }

    // Feedback

    /// Show a message sent by the engine
    pub fn handle_notification(&mut self, notification: Notification) -> Acknowledgement {
        match notification {
            Notification::NoFilteredContent { message } => {
                let message = message.unwrap_or_else(|| NO_FILTERED_CONTENT_FALLBACK.to_string());
                self.notices.show(message);
            }
        }
        Acknowledgement { acknowledged: true }
    }

    /// Wait for the next engine notification and show it.
    ///
    /// Notifications that arrive outside a command, such as an empty result
    /// from the delayed replay, are only seen through this or
    /// [`Selector::drain_notifications`]. Returns `None` once the engine is
    /// gone or when no notification channel is attached.
    pub async fn recv_notification(&mut self) -> Option<Acknowledgement> {
        let notification = self.notifications.as_mut()?.recv().await?;
        debug!(?notification, "notification received");
        Some(self.handle_notification(notification))
    }

    /// Handle every notification already waiting; returns how many
    pub fn drain_notifications(&mut self) -> usize {
        let mut pending = Vec::new();
        if let Some(rx) = self.notifications.as_mut() {
            while let Ok(notification) = rx.try_recv() {
                pending.push(notification);
            }
        }

        let count = pending.len();
        for notification in pending {
            self.handle_notification(notification);
        }
        count
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }

    /// Blocking message awaiting dismissal
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    fn report(&mut self, error: SelectorError) -> SelectorError {
        self.notices.show(error.to_string());
        error
    }
}
