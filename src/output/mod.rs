//! Output module for the local mirror
//!
//! This module handles:
//! - Mapping archive titles onto safe local path segments
//! - Writing downloaded assets into the mirror
//! - Recording crawl statistics

mod materializer;
mod naming;
pub mod stats;

pub use materializer::AssetMaterializer;
pub use naming::{asset_path, can_hold_asset, sanitize_filename};
pub use stats::CrawlStatistics;
