mod config;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use tagsift_engine::{DirectorySink, EngineHost, FilterEngine, LogDocument, Page, ReplayPlan};
use tagsift_selector::{JsonFileStorage, PageLink, Selector, SelectorError};
use tagsift_types::{Notification, TagCatalog, load_selected_tags};

use crate::config::Config;

/// Tagsift - keep only the debug log lines carrying the tags you care about
#[derive(Parser, Debug)]
#[command(name = "tagsift")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List known tags, marking the persisted selection
    Catalog {
        /// Only tags containing this text (case-insensitive)
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Filter a saved page by tags and print the resulting log
    Apply {
        /// HTML page holding the debug log
        #[arg(long, value_name = "FILE")]
        page: PathBuf,

        /// Tags to keep (defaults to the persisted selection)
        #[arg(value_name = "TAG")]
        tags: Vec<String>,

        /// Write the displayed log here instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Filter a saved page and download the filtered log
    Export {
        #[arg(long, value_name = "FILE")]
        page: PathBuf,

        #[arg(value_name = "TAG")]
        tags: Vec<String>,

        /// Directory receiving filtered-log-<millis>.txt
        #[arg(long, value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },

    /// Load a page the way a browser would, replaying the persisted selection
    Replay {
        #[arg(long, value_name = "FILE")]
        page: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let storage = JsonFileStorage::new(config.storage_path()?);

    match args.command {
        Cmd::Catalog { search } => {
            let selected = load_selected_tags(&storage)?.unwrap_or_default();
            for tag in TagCatalog::full().search(&search) {
                let mark = if selected.iter().any(|s| s == tag) { "x" } else { " " };
                println!("[{}] {}", mark, tag);
            }
            Ok(())
        }
        Cmd::Apply { page, tags, out } => {
            let mut tab = Tab::open(&page, &config, storage, Path::new("."), None)?;
            tab.select(&tags);
            let outcome = tab.selector.apply().await;
            tab.report(outcome);

            let engine = tab.close().await?;
            let text = displayed_log(&engine)?;
            match out {
                Some(path) => fs::write(&path, text)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{}", text),
            }
            Ok(())
        }
        Cmd::Export { page, tags, dir } => {
            let mut tab = Tab::open(&page, &config, storage, &dir, None)?;
            tab.select(&tags);
            let applied = tab.selector.apply().await;
            tab.report(applied);
            let downloaded = tab.selector.download().await;
            tab.report(downloaded);

            let engine = tab.close().await?;
            for path in engine.sink().saved() {
                println!("{}", path.display());
            }
            Ok(())
        }
        Cmd::Replay { page } => {
            let delay = Duration::from_millis(config.engine.replay_delay_ms);
            let plan = ReplayPlan::from_persisted(load_selected_tags(&storage)?, delay);
            let waits = plan.is_some();
            let mut tab = Tab::open(&page, &config, storage, Path::new("."), plan)?;

            if waits {
                // An empty result is reported; a successful replay stays silent
                let wait = delay + Duration::from_millis(50);
                let _ = tokio::time::timeout(wait, tab.selector.recv_notification()).await;
            }
            tab.selector.drain_notifications();
            tab.print_feedback();

            let engine = tab.close().await?;
            if !engine.is_filter_active() {
                eprintln!("No filter replayed");
            }
            println!("{}", displayed_log(&engine)?);
            Ok(())
        }
    }
}

/// One page with its filter engine running, and the selector pointed at it
struct Tab {
    selector: Selector<JsonFileStorage>,
    host: EngineHost<Page, DirectorySink>,
}

impl Tab {
    fn open(
        page: &Path,
        config: &Config,
        storage: JsonFileStorage,
        download_dir: &Path,
        replay: Option<ReplayPlan>,
    ) -> Result<Self> {
        let html =
            fs::read_to_string(page).with_context(|| format!("reading page {}", page.display()))?;
        let document = Page::parse_html(&html);

        let (notify_tx, notify_rx) = mpsc::unbounded_channel::<Notification>();
        let engine = FilterEngine::new(document, DirectorySink::new(download_dir), &config.engine);
        let host = EngineHost::spawn(engine, notify_tx, replay);

        let selector = Selector::start(TagCatalog::full(), storage, &config.selector)
            .with_link(PageLink::new(host.commands()))
            .with_notifications(notify_rx);

        Ok(Self { selector, host })
    }

    /// Replace the selection when tags were given on the command line
    fn select(&mut self, tags: &[String]) {
        if tags.is_empty() {
            return;
        }
        self.selector.deselect_all();
        for tag in tags {
            self.selector.toggle(tag, true);
        }
    }

    fn report<T>(&mut self, outcome: Result<T, SelectorError>) {
        if let Err(e) = outcome {
            tracing::debug!(error = %e, "command failed");
        }
        self.print_feedback();
    }

    fn print_feedback(&mut self) {
        if let Some(alert) = self.selector.alert() {
            eprintln!("alert: {}", alert);
        }
        self.selector.dismiss_alert();

        if let Some(notice) = self.selector.notices().current() {
            eprintln!("error: {}", notice.message);
        }
        self.selector.notices_mut().dismiss();
    }

    async fn close(self) -> Result<FilterEngine<Page, DirectorySink>> {
        self.host.shutdown().await.context("filter engine task failed")
    }
}

/// Text of the page's log surface as currently displayed
fn displayed_log(engine: &FilterEngine<Page, DirectorySink>) -> Result<String> {
    let node = engine.surface().context("No log element found on this page")?;
    engine
        .document()
        .display_text(node)
        .context("log element disappeared from the page")
}
