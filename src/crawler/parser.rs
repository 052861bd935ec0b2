//! HTML classifier for archive pages
//!
//! This module decides what a fetched archive page is:
//! - a container (folder listing) yielding child items and pagination links
//! - a leaf asset yielding a single download link
//! - unknown, when neither marker is present
//!
//! Classification is a pure function of the page text and its URL.

use crate::config::{parse_selector, ClassifierConfig};
use crate::url::resolve_link;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Title used when a child link has no text
const UNTITLED: &str = "untitled";

/// A child item on a folder listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildLink {
    /// Absolute URL of the child's page
    pub url: String,

    /// Link text as displayed, whitespace collapsed
    pub display_title: String,
}

/// What a fetched page turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A folder listing
    Container {
        child_links: Vec<ChildLink>,
        pagination_links: Vec<String>,
    },

    /// A single downloadable asset
    LeafAsset { download_url: String },

    /// Neither marker found, or an asset page without a usable download link
    Unknown,
}

/// Classifies archive pages using configured markers and selectors
#[derive(Debug, Clone)]
pub struct Classifier {
    container_markers: Vec<String>,
    asset_markers: Vec<String>,
    child_block: Selector,
    child_link: Selector,
    pagination: Selector,
    download: Selector,
}

impl Classifier {
    /// Compiles the selectors from the `[classifier]` configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Classifier)` - Ready to classify pages
    /// * `Err(ConfigError::InvalidSelector)` - A selector failed to parse
    pub fn new(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            container_markers: non_empty(&config.container_markers),
            asset_markers: non_empty(&config.asset_markers),
            child_block: parse_selector(&config.child_block_selector)?,
            child_link: parse_selector(&config.child_link_selector)?,
            pagination: parse_selector(&config.pagination_selector)?,
            download: parse_selector(&config.download_selector)?,
        })
    }

    /// Classifies a fetched page
    ///
    /// Container markers win over asset markers when both appear. Relative
    /// links resolve against `page_url`.
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_mirror::config::ClassifierConfig;
    /// use sumi_mirror::crawler::{Classification, Classifier};
    /// use url::Url;
    ///
    /// let classifier = Classifier::new(&ClassifierConfig::default()).unwrap();
    /// let html = r#"<p>Object Type: Asset</p><a class="fa-download" href="/f.pdf">Get</a>"#;
    /// let page = Url::parse("https://example.com/item/1").unwrap();
    ///
    /// assert_eq!(
    ///     classifier.classify(html, &page),
    ///     Classification::LeafAsset { download_url: "https://example.com/f.pdf".to_string() }
    /// );
    /// ```
    pub fn classify(&self, html: &str, page_url: &Url) -> Classification {
        if contains_any(html, &self.container_markers) {
            let document = Html::parse_document(html);
            return Classification::Container {
                child_links: self.extract_children(&document, page_url),
                pagination_links: self.extract_pagination(&document, page_url),
            };
        }

        if contains_any(html, &self.asset_markers) {
            let document = Html::parse_document(html);
            return match self.extract_download(&document, page_url) {
                Some(download_url) => Classification::LeafAsset { download_url },
                None => {
                    tracing::debug!("Asset page {} has no download link", page_url);
                    Classification::Unknown
                }
            };
        }

        Classification::Unknown
    }

    /// One child per block; blocks without a usable primary link are skipped
    fn extract_children(&self, document: &Html, page_url: &Url) -> Vec<ChildLink> {
        document
            .select(&self.child_block)
            .filter_map(|block| {
                let link = block.select(&self.child_link).next()?;
                let url = resolve_link(link.value().attr("href")?, page_url)?;
                Some(ChildLink {
                    url,
                    display_title: display_title(&link),
                })
            })
            .collect()
    }

    fn extract_pagination(&self, document: &Html, page_url: &Url) -> Vec<String> {
        document
            .select(&self.pagination)
            .filter_map(|link| resolve_link(link.value().attr("href")?, page_url))
            .collect()
    }

    fn extract_download(&self, document: &Html, page_url: &Url) -> Option<String> {
        document
            .select(&self.download)
            .find_map(|link| resolve_link(link.value().attr("href")?, page_url))
    }
}

fn display_title(link: &ElementRef<'_>) -> String {
    let title = link.text().collect::<Vec<_>>().join(" ");
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

fn contains_any(html: &str, markers: &[String]) -> bool {
    markers.iter().any(|marker| html.contains(marker.as_str()))
}

fn non_empty(markers: &[String]) -> Vec<String> {
    markers.iter().filter(|m| !m.is_empty()).cloned().collect()
}
