//! Engine configuration
//!
//! All knobs have working defaults; a deployment can override them from
//! a JSON file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Tunables for caches, grouping, and refresh throttling
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineConfig {
    /// Timestamp parse cache flushes entirely past this size
    pub timestamp_cache_capacity: usize,
    /// Transform cache flushes entirely past this size
    pub transform_cache_capacity: usize,
    /// Grouping result cache drops its oldest half past this size
    pub grouping_cache_capacity: usize,
    /// Grouping results older than this are swept
    pub grouping_cache_ttl_secs: u64,
    /// Leading-edge throttle window for sync-complete refreshes
    pub refresh_throttle_ms: u64,
    /// Whether views include provider emails unless overridden
    pub include_emails: bool,
    /// Whether views auto-load the first email page unless overridden
    pub auto_initialize: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            timestamp_cache_capacity: 500,
            transform_cache_capacity: 1000,
            grouping_cache_capacity: 50,
            grouping_cache_ttl_secs: 300,
            refresh_throttle_ms: 100,
            include_emails: true,
            auto_initialize: true,
        }
    }
}

impl TimelineConfig {
    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
