//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small archive and run the full crawl
//! cycle end-to-end against a temporary mirror directory.
//!
//! The archive:
//!
//! ```text
//! /archive                 folder: "Folder A" -> /folder-a, "Report.pdf" -> /item/report
//! /folder-a                folder: "Doc 1" -> /item/doc1, page 2 -> /folder-a/page/2
//! /folder-a/page/2         folder: "Doc 2" -> /item/doc2, page 1 -> /folder-a
//! /item/{report,doc1,doc2} assets -> /files/<name>.pdf
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use sumi_mirror::config::{
    CheckpointConfig, ClassifierConfig, Config, CrawlerConfig, Traversal, UserAgentConfig,
};
use sumi_mirror::crawler::{initial_frontier, Coordinator, CrawlOutcome};
use sumi_mirror::storage::{CheckpointStore, JsonCheckpointStore, TEMP_PREFIX};
use sumi_mirror::{CrawlState, MirrorError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const ROOT_PAGE: &str = r#"<html><body>
    <h1>Complete Archive</h1>
    <div id="post-1"><a class="new-primary" href="/folder-a">Folder A</a></div>
    <div id="post-2"><a class="new-primary" href="/item/report">Report.pdf</a></div>
</body></html>"#;

const FOLDER_A_PAGE_1: &str = r#"<html><body>
    <p>Object Type: Folder</p>
    <div id="post-11"><a class="new-primary" href="/item/doc1">Doc 1</a></div>
    <a class="page-numbers" href="/folder-a/page/2">2</a>
</body></html>"#;

const FOLDER_A_PAGE_2: &str = r#"<html><body>
    <p>Object Type: Folder</p>
    <div id="post-12"><a class="new-primary" href="/item/doc2">Doc 2</a></div>
    <a class="page-numbers" href="/folder-a">1</a>
    <a class="page-numbers" href="/folder-a/page/2">2</a>
</body></html>"#;

fn asset_page(file: &str) -> String {
    format!(
        r#"<html><body><p>Object Type: Asset</p>
        <a class="fa fa-download" href="/files/{}">Download</a></body></html>"#,
        file
    )
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html")
}

fn pdf(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(content.as_bytes().to_vec())
        .insert_header("content-type", "application/pdf")
}

/// Serves a page and raises a cancellation flag, like Ctrl-C arriving mid-fetch
struct CancelWhileServing {
    flag: Arc<AtomicBool>,
    body: &'static str,
}

impl Respond for CancelWhileServing {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.flag.store(true, Ordering::SeqCst);
        html(self.body)
    }
}

async fn mount_page(
    server: &MockServer,
    route: &str,
    response: ResponseTemplate,
    hits: u64,
) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(hits)
        .mount(server)
        .await;
}

/// Mounts an asset page and its payload, `/item/<name>` and `/files/<name>.pdf`
async fn mount_asset(server: &MockServer, name: &str, hits: u64) {
    let file = format!("{}.pdf", name);
    mount_page(server, &format!("/item/{}", name), html(asset_page(&file)), hits).await;
    let payload = pdf(&format!("%PDF {}", name));
    mount_page(server, &format!("/files/{}", file), payload, hits).await;
}

/// Mounts every route except `/folder-a`, each expected exactly once
async fn mount_archive_except_folder_a(server: &MockServer) {
    mount_page(server, "/archive", html(ROOT_PAGE), 1).await;
    mount_page(server, "/folder-a/page/2", html(FOLDER_A_PAGE_2), 1).await;
    for name in ["report", "doc1", "doc2"] {
        mount_asset(server, name, 1).await;
    }
}

async fn mount_archive(server: &MockServer) {
    mount_archive_except_folder_a(server).await;
    mount_page(server, "/folder-a", html(FOLDER_A_PAGE_1), 1).await;
}

/// Mirror destination and checkpoint records live in separate temp dirs
struct Workspace {
    mirror: TempDir,
    state: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            mirror: TempDir::new().expect("mirror dir"),
            state: TempDir::new().expect("state dir"),
        }
    }

    fn config(
        &self,
        server: &MockServer,
        traversal: Traversal,
        checkpoint_interval: u32,
    ) -> Config {
        Config {
            crawler: CrawlerConfig {
                seed_url: format!("{}/archive", server.uri()),
                destination: self.mirror.path().to_path_buf(),
                traversal,
                checkpoint_interval,
                download_delay: 0,
                asset_extension: "pdf".to_string(),
                request_timeout: 5,
                download_timeout: 5,
            },
            user_agent: UserAgentConfig {
                crawler_name: "TestMirror".to_string(),
                crawler_version: "1.0.0".to_string(),
                contact_url: "https://example.com/contact".to_string(),
                contact_email: "test@example.com".to_string(),
            },
            checkpoint: CheckpointConfig {
                queue_path: self.state.path().join("queue.json"),
                seen_path: self.state.path().join("seen.json"),
            },
            classifier: ClassifierConfig::default(),
        }
    }

    fn store(&self, config: &Config) -> JsonCheckpointStore {
        JsonCheckpointStore::from_config(&config.checkpoint)
    }

    fn mirror_path(&self, relative: &str) -> PathBuf {
        self.mirror.path().join(relative)
    }
}

fn coordinator(config: &Config, store: JsonCheckpointStore) -> Coordinator<JsonCheckpointStore> {
    let frontier = initial_frontier(config, &store).expect("load frontier");
    Coordinator::new(config, frontier, store).expect("create coordinator")
}

fn assert_full_mirror(ws: &Workspace) {
    assert!(ws.mirror_path("Folder A").is_dir());
    assert_eq!(read(&ws.mirror_path("Report.pdf")), "%PDF report");
    assert_eq!(read(&ws.mirror_path("Folder A/Doc 1.pdf")), "%PDF doc1");
    // Page 2 of the listing fills the same folder
    assert_eq!(read(&ws.mirror_path("Folder A/Doc 2.pdf")), "%PDF doc2");
    // Assets are files only, never directories
    assert!(!ws.mirror_path("Report.pdf.pdf").exists());
    assert!(!ws.mirror_path("Folder A/Doc 1").exists());

    for dir in [ws.mirror_path(""), ws.mirror_path("Folder A")] {
        let leftovers: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(TEMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty(), "{}: {:?}", dir.display(), leftovers);
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

#[tokio::test]
async fn test_full_mirror_single_run() {
    let server = MockServer::start().await;
    mount_archive(&server).await;

    let ws = Workspace::new();
    let config = ws.config(&server, Traversal::Lifo, 10);
    let store = ws.store(&config);

    let mut coordinator = coordinator(&config, store.clone());
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome, CrawlOutcome::Completed);
    assert_eq!(coordinator.state(), CrawlState::Completed);
    assert_full_mirror(&ws);

    // Completed crawls leave no resumable state behind
    assert!(!store.queue_path().exists());
    assert!(!store.seen_path().exists());

    let stats = coordinator.statistics();
    assert_eq!(stats.containers_expanded, 3);
    assert_eq!(stats.assets_downloaded, 3);
    assert_eq!(stats.pages_fetched, 6);
}

#[tokio::test]
async fn test_fifo_traversal_with_frequent_checkpoints() {
    let server = MockServer::start().await;
    mount_archive(&server).await;

    let ws = Workspace::new();
    let config = ws.config(&server, Traversal::Fifo, 1);

    let mut coordinator = coordinator(&config, ws.store(&config));
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome, CrawlOutcome::Completed);
    assert_full_mirror(&ws);
    // One per task plus the final save
    assert_eq!(coordinator.statistics().checkpoints_saved, 7);
    assert!(!ws.store(&config).exists());
}

#[tokio::test]
async fn test_interrupt_then_resume_matches_single_run() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let config = ws.config(&server, Traversal::Lifo, 10);

    // First run: Ctrl-C arrives while /folder-a is being fetched
    let mut first = coordinator(&config, ws.store(&config));
    Mock::given(method("GET"))
        .and(path("/folder-a"))
        .respond_with(CancelWhileServing {
            flag: first.cancellation_handle(),
            body: FOLDER_A_PAGE_1,
        })
        .expect(1)
        .mount(&server)
        .await;
    mount_archive_except_folder_a(&server).await;

    let outcome = first.run().await.expect("First run failed");
    assert_eq!(outcome, CrawlOutcome::Interrupted);
    assert_eq!(first.state(), CrawlState::Draining);

    // The in-flight folder was fully expanded before the save
    assert!(ws.mirror_path("Folder A").is_dir());
    let saved = ws
        .store(&config)
        .load()
        .expect("load checkpoint")
        .expect("checkpoint present after interrupt");
    assert_eq!(saved.queue.len(), 2);
    assert!(saved.seen.contains(&format!("{}/folder-a/page/2", server.uri())));
    assert!(ws.store(&config).seen_path().exists());

    // Second run resumes; every route is still hit exactly once overall
    let mut second = coordinator(&config, ws.store(&config));
    let outcome = second.run().await.expect("Second run failed");

    assert_eq!(outcome, CrawlOutcome::Completed);
    assert_full_mirror(&ws);
    assert!(!ws.store(&config).exists());
}

#[tokio::test]
async fn test_existing_assets_are_not_refetched() {
    let server = MockServer::start().await;
    mount_page(&server, "/archive", html(ROOT_PAGE), 1).await;
    mount_page(&server, "/folder-a", html(FOLDER_A_PAGE_1), 1).await;
    mount_page(&server, "/folder-a/page/2", html(FOLDER_A_PAGE_2), 1).await;
    // Already on disk from an earlier run: neither page nor payload is fetched
    mount_asset(&server, "report", 0).await;
    for name in ["doc1", "doc2"] {
        mount_asset(&server, name, 1).await;
    }

    let ws = Workspace::new();
    std::fs::write(ws.mirror_path("Report.pdf"), "%PDF report").unwrap();
    let config = ws.config(&server, Traversal::Lifo, 10);

    let mut coordinator = coordinator(&config, ws.store(&config));
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome, CrawlOutcome::Completed);
    assert_full_mirror(&ws);
    assert_eq!(coordinator.statistics().assets_skipped, 1);
}

#[tokio::test]
async fn test_fetch_failure_keeps_task_for_next_run() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let config = ws.config(&server, Traversal::Lifo, 10);

    Mock::given(method("GET"))
        .and(path("/archive"))
        .respond_with(html(ROOT_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/item/report"))
        .respond_with(html(asset_page("report.pdf")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(pdf("%PDF report"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/folder-a"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut first = coordinator(&config, ws.store(&config));
    let err = first.run().await.expect_err("500 should fail the run");

    assert!(matches!(err, MirrorError::HttpStatus { status: 500, .. }));
    assert_eq!(first.state(), CrawlState::Failed);
    assert_eq!(read(&ws.mirror_path("Report.pdf")), "%PDF report");

    // The failed task was put back and checkpointed, not lost
    let saved = ws
        .store(&config)
        .load()
        .expect("load checkpoint")
        .expect("checkpoint written on failure");
    assert_eq!(saved.queue.len(), 1);
    assert_eq!(saved.queue[0].url, format!("{}/folder-a", server.uri()));
    assert_eq!(saved.queue[0].path, ws.mirror_path("Folder A"));

    // The archive recovers; rerunning finishes the job without refetching the root
    server.reset().await;
    mount_page(&server, "/archive", html(ROOT_PAGE), 0).await;
    mount_asset(&server, "report", 0).await;
    mount_page(&server, "/folder-a", html(FOLDER_A_PAGE_1), 1).await;
    mount_page(&server, "/folder-a/page/2", html(FOLDER_A_PAGE_2), 1).await;
    for name in ["doc1", "doc2"] {
        mount_asset(&server, name, 1).await;
    }

    let mut second = coordinator(&config, ws.store(&config));
    let outcome = second.run().await.expect("Second run failed");

    assert_eq!(outcome, CrawlOutcome::Completed);
    assert_full_mirror(&ws);
}

#[tokio::test]
async fn test_failed_asset_download_is_fatal_and_leaves_no_file() {
    let server = MockServer::start().await;
    let root = r#"<p>Complete Archive</p>
        <div id="post-1"><a class="new-primary" href="/item/report">Report</a></div>"#;
    mount_page(&server, "/archive", html(root), 1).await;
    mount_page(&server, "/item/report", html(asset_page("report.pdf")), 1).await;
    mount_page(&server, "/files/report.pdf", ResponseTemplate::new(404), 1).await;

    let ws = Workspace::new();
    let config = ws.config(&server, Traversal::Lifo, 10);

    let mut coordinator = coordinator(&config, ws.store(&config));
    let err = coordinator.run().await.expect_err("404 payload should fail");

    assert!(matches!(err, MirrorError::HttpStatus { status: 404, .. }));
    assert!(!ws.mirror_path("Report.pdf").exists());

    let saved = ws.store(&config).load().unwrap().unwrap();
    assert_eq!(saved.queue.len(), 1);
    assert_eq!(saved.queue[0].path, ws.mirror_path("Report"));
}

#[tokio::test]
async fn test_unknown_page_is_consumed_and_crawl_continues() {
    let server = MockServer::start().await;
    let root = r#"<p>Complete Archive</p>
        <div id="post-1"><a class="new-primary" href="/item/broken">Broken</a></div>
        <div id="post-2"><a class="new-primary" href="/item/report">Report</a></div>"#;
    mount_page(&server, "/archive", html(root), 1).await;
    mount_page(&server, "/item/broken", html("<html><body>Maintenance</body></html>"), 1).await;
    mount_asset(&server, "report", 1).await;

    let ws = Workspace::new();
    let config = ws.config(&server, Traversal::Fifo, 10);

    let mut coordinator = coordinator(&config, ws.store(&config));
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome, CrawlOutcome::Completed);
    assert_eq!(coordinator.statistics().unknown_pages, 1);
    assert!(!ws.mirror_path("Broken").exists());
    assert!(!ws.mirror_path("Broken.pdf").exists());
    assert_eq!(read(&ws.mirror_path("Report.pdf")), "%PDF report");
}

#[tokio::test]
async fn test_fresh_store_clear_discards_checkpoint() {
    let server = MockServer::start().await;
    mount_archive(&server).await;

    let ws = Workspace::new();
    let config = ws.config(&server, Traversal::Lifo, 10);

    // A stale checkpoint pointing at work that no longer exists
    let mut store = ws.store(&config);
    let stale = sumi_mirror::FrontierSnapshot {
        queue: vec![sumi_mirror::Task::new(
            ws.mirror_path("Gone"),
            format!("{}/gone", server.uri()),
        )],
        seen: Default::default(),
    };
    store.save(&stale).unwrap();
    store.clear().unwrap();

    let mut coordinator = coordinator(&config, ws.store(&config));
    assert_eq!(coordinator.frontier().len(), 1);
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome, CrawlOutcome::Completed);
    assert_full_mirror(&ws);
}

#[tokio::test]
async fn test_resume_sweeps_downloads_cut_off_by_a_kill() {
    let server = MockServer::start().await;
    mount_archive(&server).await;

    let ws = Workspace::new();
    let config = ws.config(&server, Traversal::Lifo, 10);

    // What a hard kill mid-write leaves behind in each folder
    std::fs::create_dir(ws.mirror_path("Folder A")).unwrap();
    std::fs::write(ws.mirror_path(".sumi-k1LL3d"), b"%PDF trunc").unwrap();
    std::fs::write(ws.mirror_path("Folder A/.sumi-x9Y8z7"), b"%PDF trunc").unwrap();

    let mut coordinator = coordinator(&config, ws.store(&config));
    let outcome = coordinator.run().await.expect("Crawl failed");

    assert_eq!(outcome, CrawlOutcome::Completed);
    assert_full_mirror(&ws);
}
