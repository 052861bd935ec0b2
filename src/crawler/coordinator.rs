//! Crawler coordinator - the crawl engine
//!
//! This module contains the main crawl loop, including:
//! - Resuming from a checkpoint or seeding a fresh frontier
//! - Popping tasks, fetching and classifying their pages
//! - Expanding folders into new tasks and downloading assets
//! - Periodic checkpoints, interrupt draining, and final cleanup
//!
//! The loop is strictly sequential: every fetch and write is awaited before
//! the next begins, and cancellation is only observed between tasks.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::frontier::{Frontier, Task};
use crate::crawler::parser::{ChildLink, Classification, Classifier};
use crate::output::{
    asset_path, can_hold_asset, sanitize_filename, AssetMaterializer, CrawlStatistics,
};
use crate::state::CrawlState;
use crate::storage::{remove_stale_temp_files, CheckpointStore, JsonCheckpointStore};
use crate::MirrorError;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// How a crawl run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Frontier exhausted; the checkpoint has been cleared
    Completed,

    /// Cancelled; the frontier was checkpointed and the run can be resumed
    Interrupted,
}

/// Main crawl engine
///
/// Owns the frontier and the checkpoint store it persists to. Both are passed
/// in at construction so tests can supply their own.
pub struct Coordinator<S: CheckpointStore = JsonCheckpointStore> {
    frontier: Frontier,
    store: S,
    client: Client,
    classifier: Classifier,
    materializer: AssetMaterializer,
    checkpoint_interval: u64,
    download_delay: Duration,
    asset_extension: String,
    state: CrawlState,
    cancel: Arc<AtomicBool>,
    stats: CrawlStatistics,
}

impl<S: CheckpointStore> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `frontier` - Pending work, from `initial_frontier` or built by hand
    /// * `store` - Where checkpoints are written
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to `run`
    /// * `Err(MirrorError)` - HTTP client or classifier failed to build
    pub fn new(config: &Config, frontier: Frontier, store: S) -> Result<Self, MirrorError> {
        let timeout = Duration::from_secs(config.crawler.request_timeout);
        let client = build_http_client(&config.user_agent, timeout)?;
        let classifier = Classifier::new(&config.classifier)?;
        let materializer = AssetMaterializer::new(
            client.clone(),
            Duration::from_secs(config.crawler.download_timeout),
        );

        Ok(Self {
            frontier,
            store,
            client,
            classifier,
            materializer,
            checkpoint_interval: u64::from(config.crawler.checkpoint_interval.max(1)),
            download_delay: Duration::from_millis(config.crawler.download_delay),
            asset_extension: config.crawler.asset_extension.clone(),
            state: CrawlState::Idle,
            cancel: Arc::new(AtomicBool::new(false)),
            stats: CrawlStatistics::default(),
        })
    }

    /// Get a cancellation handle for graceful shutdown.
    ///
    /// Call `store(true, Ordering::SeqCst)` on the returned Arc to stop the
    /// run after the task in flight.
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Request cancellation of the run.
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    fn is_cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the main crawl loop
    ///
    /// One iteration per task:
    /// 1. Stop if cancellation was requested, or the frontier is empty
    /// 2. Skip the task if its asset file already exists
    /// 3. Fetch and classify the page
    /// 4. Expand a folder into new tasks, or download an asset
    /// 5. Checkpoint every `checkpoint-interval` completed tasks
    ///
    /// A failing task is put back on the frontier and a best-effort
    /// checkpoint is written before the error is returned, so the task is
    /// retried by the next run.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome::Completed)` - All work done, checkpoint cleared
    /// * `Ok(CrawlOutcome::Interrupted)` - Cancelled, checkpoint saved
    /// * `Err(MirrorError)` - Fatal fetch, filesystem, or checkpoint error
    pub async fn run(&mut self) -> Result<CrawlOutcome, MirrorError> {
        self.state = self.state.transition(CrawlState::Running)?;
        tracing::info!(
            "Starting crawl: {} pending, {} seen",
            self.frontier.len(),
            self.frontier.seen_count()
        );

        let start_time = Instant::now();

        loop {
            if self.is_cancel_requested() {
                let outcome = self.drain();
                self.stats.log_summary(start_time.elapsed());
                return outcome;
            }

            let task = match self.frontier.pop() {
                Some(task) => task,
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            };

            if let Err(e) = self.process_task(&task).await {
                tracing::error!(
                    "Error processing {} ({}): {}",
                    task.url,
                    task.path.display(),
                    e
                );
                if e.is_fetch_failure() {
                    tracing::warn!("The archive request will be retried first on the next run");
                }
                self.frontier.restore(task);
                self.save_best_effort();
                self.fail();
                self.stats.log_summary(start_time.elapsed());
                return Err(e);
            }

            self.stats.tasks_completed += 1;

            if self.stats.tasks_completed % self.checkpoint_interval == 0 {
                if let Err(e) = self.checkpoint() {
                    tracing::error!("Checkpoint failed: {}", e);
                    self.fail();
                    return Err(e);
                }

                let elapsed = start_time.elapsed();
                tracing::info!(
                    "Progress: {} tasks done, {} in frontier, {:.2} tasks/sec",
                    self.stats.tasks_completed,
                    self.frontier.len(),
                    self.stats.rate(elapsed)
                );
            }
        }

        let outcome = self.complete();
        self.stats.log_summary(start_time.elapsed());
        outcome
    }

    /// Processes a single task
    async fn process_task(&mut self, task: &Task) -> Result<(), MirrorError> {
        if can_hold_asset(&task.path) {
            let existing = asset_path(&task.path, &self.asset_extension);
            if existing.is_file() {
                tracing::debug!("Skipping {}: {} exists", task.url, existing.display());
                self.stats.assets_skipped += 1;
                return Ok(());
            }
        }

        tracing::info!("Fetching: {}", task.url);
        let page = fetch_page(&self.client, &task.url).await?;
        self.stats.pages_fetched += 1;

        match self.classifier.classify(&page.body, &page.final_url) {
            Classification::Container {
                child_links,
                pagination_links,
            } => self.expand_container(task, child_links, pagination_links),

            Classification::LeafAsset { download_url } => {
                self.download_asset(task, &download_url).await
            }

            Classification::Unknown => {
                tracing::warn!("Unknown object type at {}", task.url);
                self.stats.unknown_pages += 1;
                Ok(())
            }
        }
    }

    /// Creates the folder's directory and enqueues its children and pages
    ///
    /// Children land in a subdirectory named after their title; pagination
    /// targets the same directory so every page of a listing fills one folder.
    /// Temp files left in the directory by a killed run are removed here.
    fn expand_container(
        &mut self,
        task: &Task,
        child_links: Vec<ChildLink>,
        pagination_links: Vec<String>,
    ) -> Result<(), MirrorError> {
        std::fs::create_dir_all(&task.path)
            .map_err(|e| MirrorError::filesystem(&task.path, e))?;

        let swept = remove_stale_temp_files(&task.path)
            .map_err(|e| MirrorError::filesystem(&task.path, e))?;
        if swept > 0 {
            tracing::info!(
                "Removed {} unfinished download(s) from {}",
                swept,
                task.path.display()
            );
        }

        let mut added = 0;
        for child in child_links {
            let path = task.path.join(sanitize_filename(&child.display_title));
            if self.frontier.enqueue(Task::new(path, child.url)) {
                added += 1;
            }
        }
        for url in pagination_links {
            if self.frontier.enqueue(Task::new(task.path.clone(), url)) {
                added += 1;
            }
        }

        self.stats.containers_expanded += 1;
        self.stats.tasks_enqueued += added;
        tracing::debug!("{}: {} new tasks", task.path.display(), added);
        Ok(())
    }

    async fn download_asset(&mut self, task: &Task, download_url: &str) -> Result<(), MirrorError> {
        let file = asset_path(&task.path, &self.asset_extension);
        tracing::info!("Downloading to {}", file.display());

        let bytes = self.materializer.materialize(download_url, &file).await?;
        self.stats.assets_downloaded += 1;
        self.stats.bytes_downloaded += bytes;

        if !self.download_delay.is_zero() {
            tokio::time::sleep(self.download_delay).await;
        }
        Ok(())
    }

    /// Saves the frontier to the checkpoint store
    fn checkpoint(&mut self) -> Result<(), MirrorError> {
        self.store.save(&self.frontier.snapshot())?;
        self.stats.checkpoints_saved += 1;
        Ok(())
    }

    /// Saves on the failure path; a save error is logged, not returned,
    /// so the original error reaches the caller
    fn save_best_effort(&mut self) {
        match self.checkpoint() {
            Ok(()) => tracing::info!(
                "Saved checkpoint with {} pending tasks",
                self.frontier.len()
            ),
            Err(e) => tracing::error!("Could not save checkpoint after failure: {}", e),
        }
    }

    /// Interrupt path: checkpoint and stop without popping another task
    fn drain(&mut self) -> Result<CrawlOutcome, MirrorError> {
        self.state = self.state.transition(CrawlState::Draining)?;
        tracing::info!("Interrupted, saving state before exit");

        if let Err(e) = self.checkpoint() {
            self.fail();
            return Err(e);
        }

        tracing::info!(
            "Saved {} pending tasks; rerun to resume",
            self.frontier.len()
        );
        Ok(CrawlOutcome::Interrupted)
    }

    /// Completion path: final save, then clear
    ///
    /// The clear only happens after the final save succeeded and only for a
    /// genuinely empty frontier.
    fn complete(&mut self) -> Result<CrawlOutcome, MirrorError> {
        debug_assert!(self.frontier.is_empty());

        if let Err(e) = self.checkpoint() {
            self.fail();
            return Err(e);
        }
        if let Err(e) = self.store.clear() {
            self.fail();
            return Err(e.into());
        }

        self.state = self.state.transition(CrawlState::Completed)?;
        tracing::info!("Done. Queue empty and state files cleaned up.");
        Ok(CrawlOutcome::Completed)
    }

    fn fail(&mut self) {
        if self.state.can_transition_to(CrawlState::Failed) {
            self.state = CrawlState::Failed;
        }
    }
}

/// Loads the frontier from a checkpoint, or seeds a new one
///
/// # Arguments
///
/// * `config` - Supplies the seed URL, root destination, and traversal order
/// * `store` - Checkpoint to resume from
///
/// # Returns
///
/// * `Ok(Frontier)` - The resumed frontier, or one holding just the seed task
/// * `Err(MirrorError)` - A checkpoint exists but could not be read
pub fn initial_frontier<S: CheckpointStore>(
    config: &Config,
    store: &S,
) -> Result<Frontier, MirrorError> {
    let traversal = config.crawler.traversal;

    match store.load()? {
        Some(snapshot) => {
            tracing::info!(
                "Loaded checkpoint: {} pending tasks, {} seen URLs",
                snapshot.queue.len(),
                snapshot.seen.len()
            );
            Ok(Frontier::from_snapshot(traversal, snapshot))
        }
        None => {
            let seed_url = Url::parse(&config.crawler.seed_url)?;
            let seed = Task::new(
                PathBuf::from(&config.crawler.destination),
                seed_url.to_string(),
            );
            tracing::info!("No checkpoint found, seeding with {}", seed.url);
            Ok(Frontier::seeded(traversal, seed))
        }
    }
}

/// Runs the main crawl operation
///
/// This function orchestrates the entire crawl process:
///
/// 1. Open the checkpoint store (cleared first when `fresh`)
/// 2. Resume the frontier or seed it
/// 3. Wire Ctrl-C to the coordinator's cancellation flag
/// 4. Run the crawl loop to completion or interruption
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `fresh` - Discard any existing checkpoint before starting
///
/// # Example
///
/// ```no_run
/// use sumi_mirror::config::load_config;
/// use sumi_mirror::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("mirror.toml"))?;
/// run_crawl(config, false).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, fresh: bool) -> Result<CrawlOutcome, MirrorError> {
    let mut store = JsonCheckpointStore::from_config(&config.checkpoint);
    if fresh {
        tracing::info!("Discarding existing checkpoint");
        store.clear()?;
    }

    let frontier = initial_frontier(&config, &store)?;
    let mut coordinator = Coordinator::new(&config, frontier, store)?;

    let cancel = coordinator.cancellation_handle();
    let listener = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Ctrl-C received, finishing the current task before saving");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let result = coordinator.run().await;
    listener.abort();
    result
}
