use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Sumi-Mirror
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Order in which pending tasks are taken off the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traversal {
    /// Most recently discovered first (depth-first, small frontier)
    #[default]
    Lifo,
    /// Oldest first (roughly level-order)
    Fifo,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Root URL of the archive
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Local directory the archive is mirrored into
    pub destination: PathBuf,

    /// Frontier discipline
    #[serde(default)]
    pub traversal: Traversal,

    /// Number of completed tasks between checkpoint saves
    #[serde(rename = "checkpoint-interval", default = "default_checkpoint_interval")]
    pub checkpoint_interval: u32,

    /// Pause after each asset download (milliseconds)
    #[serde(rename = "download-delay", default = "default_download_delay")]
    pub download_delay: u64,

    /// Extension given to downloaded assets, without the leading dot
    #[serde(rename = "asset-extension", default = "default_asset_extension")]
    pub asset_extension: String,

    /// Timeout for fetching a page (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Timeout for downloading one asset payload (seconds)
    ///
    /// Must cover the largest asset in the archive; a download that runs over
    /// fails the run and is retried first on the next one.
    #[serde(rename = "download-timeout", default = "default_download_timeout")]
    pub download_timeout: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Locations of the two checkpoint records
#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointConfig {
    /// Pending task queue record
    #[serde(rename = "queue-path", default = "default_queue_path")]
    pub queue_path: PathBuf,

    /// Seen URL set record
    #[serde(rename = "seen-path", default = "default_seen_path")]
    pub seen_path: PathBuf,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            queue_path: default_queue_path(),
            seen_path: default_seen_path(),
        }
    }
}

/// Markers and selectors used to classify archive pages
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Any of these substrings marks a page as a folder listing
    #[serde(rename = "container-markers", default = "default_container_markers")]
    pub container_markers: Vec<String>,

    /// Any of these substrings marks a page as a single asset
    #[serde(rename = "asset-markers", default = "default_asset_markers")]
    pub asset_markers: Vec<String>,

    /// Selects one block per child item on a listing page
    ///
    /// The default `div[id^='post-']` is a prefix match, so it also accepts
    /// ids like `post-nav` that the archive never uses for items. CSS has no
    /// way to require digits after the prefix; override this if a theme
    /// puts other `post-` blocks on listing pages.
    #[serde(rename = "child-block-selector", default = "default_child_block_selector")]
    pub child_block_selector: String,

    /// Selects the primary link inside a child block
    #[serde(rename = "child-link-selector", default = "default_child_link_selector")]
    pub child_link_selector: String,

    /// Selects pagination links on a listing page
    #[serde(rename = "pagination-selector", default = "default_pagination_selector")]
    pub pagination_selector: String,

    /// Selects the download link on an asset page
    #[serde(rename = "download-selector", default = "default_download_selector")]
    pub download_selector: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            container_markers: default_container_markers(),
            asset_markers: default_asset_markers(),
            child_block_selector: default_child_block_selector(),
            child_link_selector: default_child_link_selector(),
            pagination_selector: default_pagination_selector(),
            download_selector: default_download_selector(),
        }
    }
}

fn default_checkpoint_interval() -> u32 {
    10
}

fn default_download_delay() -> u64 {
    1000
}

fn default_asset_extension() -> String {
    "pdf".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_download_timeout() -> u64 {
    300
}

fn default_queue_path() -> PathBuf {
    PathBuf::from("queue.json")
}

fn default_seen_path() -> PathBuf {
    PathBuf::from("seen.json")
}

fn default_container_markers() -> Vec<String> {
    vec![
        "Object Type: Folder".to_string(),
        "Complete Archive".to_string(),
    ]
}

fn default_asset_markers() -> Vec<String> {
    vec!["Object Type: Asset".to_string()]
}

fn default_child_block_selector() -> String {
    "div[id^='post-']".to_string()
}

fn default_child_link_selector() -> String {
    "a.new-primary".to_string()
}

fn default_pagination_selector() -> String {
    "a.page-numbers".to_string()
}

fn default_download_selector() -> String {
    "a.fa-download".to_string()
}
