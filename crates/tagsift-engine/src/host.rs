use std::time::Duration;

use tagsift_types::{Envelope, Notification};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::document::LogDocument;
use crate::engine::FilterEngine;
use crate::export::DownloadSink;
use crate::indicator::PageEvent;

/// A persisted selection to re-apply once the page has had time to render
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayPlan {
    pub tags: Vec<String>,
    pub delay: Duration,
}

impl ReplayPlan {
    /// Plan a replay only when a non-empty selection was persisted
    pub fn from_persisted(tags: Option<Vec<String>>, delay: Duration) -> Option<Self> {
        tags.filter(|t| !t.is_empty())
            .map(|tags| Self { tags, delay })
    }
}

/// Runs a [`FilterEngine`] for one page load.
///
/// Commands, page events and the replay timer are handled one at a time on a
/// single task. Shutting the host down stands for navigating away: the pending
/// replay is cancelled and the engine is handed back.
pub struct EngineHost<D, S> {
    commands: mpsc::UnboundedSender<Envelope>,
    page_events: mpsc::UnboundedSender<PageEvent>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<FilterEngine<D, S>>,
}

impl<D, S> EngineHost<D, S>
where
    D: LogDocument + Send + 'static,
    S: DownloadSink + Send + 'static,
{
    pub fn spawn(
        engine: FilterEngine<D, S>,
        notifications: mpsc::UnboundedSender<Notification>,
        replay: Option<ReplayPlan>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (page_events, event_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run(
            engine,
            command_rx,
            event_rx,
            notifications,
            replay,
            cancel.clone(),
        ));

        Self {
            commands,
            page_events,
            cancel,
            task,
        }
    }

    /// Sender the selector uses to reach this page
    pub fn commands(&self) -> mpsc::UnboundedSender<Envelope> {
        self.commands.clone()
    }

    /// Sender the rendering side uses for indicator interaction
    pub fn page_events(&self) -> mpsc::UnboundedSender<PageEvent> {
        self.page_events.clone()
    }

    /// Stop processing and return the engine
    pub async fn shutdown(self) -> Result<FilterEngine<D, S>, tokio::task::JoinError> {
        self.cancel.cancel();
        drop(self.commands);
        drop(self.page_events);
        self.task.await
    }
}

async fn run<D, S>(
    mut engine: FilterEngine<D, S>,
    mut command_rx: mpsc::UnboundedReceiver<Envelope>,
    mut event_rx: mpsc::UnboundedReceiver<PageEvent>,
    notifications: mpsc::UnboundedSender<Notification>,
    mut replay: Option<ReplayPlan>,
    cancel: CancellationToken,
) -> FilterEngine<D, S>
where
    D: LogDocument,
    S: DownloadSink,
{
    let delay = replay.as_ref().map(|p| p.delay).unwrap_or_default();
    let replay_timer = tokio::time::sleep(delay);
    tokio::pin!(replay_timer);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            _ = &mut replay_timer, if replay.is_some() => {
                if let Some(plan) = replay.take() {
                    debug!(tags = plan.tags.len(), "replaying persisted selection");
                    if let Some(notification) = engine.replay(&plan.tags) {
                        let _ = notifications.send(notification);
                    }
                }
            }

            Some(envelope) = command_rx.recv() => {
                let handled = engine.handle(envelope.command);
                if let Some(notification) = handled.notification {
                    let _ = notifications.send(notification);
                }
                // The selector may have gone away; nothing to do then
                let _ = envelope.reply.send(handled.reply);
            }

            Some(event) = event_rx.recv() => {
                engine.handle_page_event(event);
            }
        }
    }

    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Strategy;
    use crate::export::RecordingSink;
    use crate::page::{Element, Page};
    use tagsift_types::{Command, EngineConfig, Reply};

    const LOG: &str = "METHOD_ENTRY foo\nOTHER bar\nUSER_DEBUG baz";

    fn log_page(text: &str) -> Page {
        Page::from_elements(vec![Element::new("pre").with_text(text)])
    }

    fn engine(page: Page) -> FilterEngine<Page, RecordingSink> {
        FilterEngine::new(page, RecordingSink::default(), &EngineConfig::default())
    }

    fn surface(page: &Page) -> String {
        let pre = page.query(&Strategy::Tag("pre"))[0];
        page.display_text(pre).unwrap()
    }

    async fn send(host: &EngineHost<Page, RecordingSink>, command: Command) -> Reply {
        let (envelope, reply) = Envelope::new(command);
        host.commands().send(envelope).unwrap();
        reply.await.unwrap()
    }

    #[test]
    fn test_replay_plan_needs_tags() {
        let delay = Duration::from_millis(5);
        assert!(ReplayPlan::from_persisted(None, delay).is_none());
        assert!(ReplayPlan::from_persisted(Some(Vec::new()), delay).is_none());
        assert!(ReplayPlan::from_persisted(Some(vec!["A".into()]), delay).is_some());
    }

    #[tokio::test]
    async fn test_commands_round_trip() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let host = EngineHost::spawn(engine(log_page(LOG)), tx, None);

        let reply = send(
            &host,
            Command::ApplyFilter {
                tags: vec!["USER_DEBUG".to_string()],
            },
        )
        .await;
        assert_eq!(reply, Reply::ok());

        let reply = send(&host, Command::DownloadFiltered).await;
        assert_eq!(reply, Reply::ok());

        let engine = host.shutdown().await.unwrap();
        assert_eq!(surface(engine.document()), "USER_DEBUG baz");
        assert_eq!(engine.sink().saved.len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_no_match_sends_notification() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let host = EngineHost::spawn(engine(log_page(LOG)), tx, None);

        let reply = send(
            &host,
            Command::ApplyFilter {
                tags: vec!["NOPE".to_string()],
            },
        )
        .await;
        assert!(reply.success);
        assert_eq!(rx.recv().await, Some(Notification::no_filtered_content()));

        let engine = host.shutdown().await.unwrap();
        assert_eq!(surface(engine.document()), LOG);
    }

    #[tokio::test]
    async fn test_download_before_apply_fails_in_reply() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let host = EngineHost::spawn(engine(log_page(LOG)), tx, None);

        let reply = send(&host, Command::DownloadFiltered).await;
        assert!(!reply.success);

        let engine = host.shutdown().await.unwrap();
        assert!(engine.sink().saved.is_empty());
    }

    #[tokio::test]
    async fn test_replay_applies_after_delay() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let plan = ReplayPlan::from_persisted(
            Some(vec!["METHOD_ENTRY".to_string()]),
            Duration::from_millis(10),
        );
        let host = EngineHost::spawn(engine(log_page(LOG)), tx, plan);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let engine = host.shutdown().await.unwrap();
        assert_eq!(surface(engine.document()), "METHOD_ENTRY foo");
        assert!(engine.is_filter_active());
    }

    #[tokio::test]
    async fn test_replay_skipped_when_page_has_no_log() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let plan = ReplayPlan::from_persisted(
            Some(vec!["NOPE".to_string()]),
            Duration::from_millis(10),
        );
        let page = Page::from_elements(vec![Element::new("pre").with_text("spinner")]);
        let host = EngineHost::spawn(engine(page), tx, plan);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let engine = host.shutdown().await.unwrap();
        assert!(!engine.session().is_captured());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending_replay() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let plan = ReplayPlan::from_persisted(
            Some(vec!["USER_DEBUG".to_string()]),
            Duration::from_secs(60),
        );
        let host = EngineHost::spawn(engine(log_page(LOG)), tx, plan);

        let engine = host.shutdown().await.unwrap();
        assert_eq!(surface(engine.document()), LOG);
        assert!(!engine.is_filter_active());
    }

    #[tokio::test]
    async fn test_indicator_clear_event() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let host = EngineHost::spawn(engine(log_page(LOG)), tx, None);

        send(
            &host,
            Command::ApplyFilter {
                tags: vec!["USER_DEBUG".to_string()],
            },
        )
        .await;
        host.page_events()
            .send(PageEvent::IndicatorClearPressed)
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let engine = host.shutdown().await.unwrap();
        assert_eq!(surface(engine.document()), LOG);
        assert!(engine.document().indicator().is_none());
    }
}
