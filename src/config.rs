use crate::error::{Result, ShootError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Providers whose content can be embedded in a note
pub const DEFAULT_EMBED_PATTERN: &str =
    r"(youtube\.com|youtu\.be|twitter\.com|instagram\.com|slideshare\.net|figma\.com)";

/// Default depth of ancestor searches by tag
pub const DEFAULT_PARENT_SEARCH_DEPTH: usize = 10;

/// Depth of the anchor search around YouTube thumbnails
pub const DEFAULT_YOUTUBE_ANCHOR_DEPTH: usize = 5;

/// Share of the viewport (in percent) above which a target is oversized
pub const DEFAULT_LARGER_THAN_WINDOW_PERCENT: f64 = 110.0;

/// Above this many elements or meaningful child nodes, frame bounds use the element rect
pub const DEFAULT_MAX_BOUNDS_CHILDREN: usize = 50;

/// Number of ancestors frame bounds climb looking for a meaningful element
pub const DEFAULT_BOUNDS_PARENT_DEPTH: usize = 5;

/// From this many child nodes on, selection rects are reported unfiltered
pub const DEFAULT_MAX_RANGE_CHILD_NODES: usize = 150;

/// Tunables of the capture heuristics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HelperConfig {
    /// Regular expression (matched case-insensitively) recognizing embed provider URLs
    pub embed_pattern: String,

    /// Maximum number of elements inspected when searching ancestors by tag
    pub parent_search_depth: usize,

    /// Maximum number of elements inspected when looking for a thumbnail's anchor
    pub youtube_anchor_depth: usize,

    /// Viewport share (percent) above which a target counts as larger than the window
    pub larger_than_window_percent: f64,

    /// Subtree size above which frame bounds skip inspecting children
    pub max_bounds_children: usize,

    /// Ancestors inspected when the pointed element isn't meaningful
    pub bounds_parent_depth: usize,

    /// Child node count from which useless selection rects are kept
    pub max_range_child_nodes: usize,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            embed_pattern: DEFAULT_EMBED_PATTERN.to_string(),
            parent_search_depth: DEFAULT_PARENT_SEARCH_DEPTH,
            youtube_anchor_depth: DEFAULT_YOUTUBE_ANCHOR_DEPTH,
            larger_than_window_percent: DEFAULT_LARGER_THAN_WINDOW_PERCENT,
            max_bounds_children: DEFAULT_MAX_BOUNDS_CHILDREN,
            bounds_parent_depth: DEFAULT_BOUNDS_PARENT_DEPTH,
            max_range_child_nodes: DEFAULT_MAX_RANGE_CHILD_NODES,
        }
    }
}

impl HelperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn embed_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.embed_pattern = pattern.into();
        self
    }

    pub fn parent_search_depth(mut self, depth: usize) -> Self {
        self.parent_search_depth = depth;
        self
    }

    pub fn youtube_anchor_depth(mut self, depth: usize) -> Self {
        self.youtube_anchor_depth = depth;
        self
    }

    pub fn larger_than_window_percent(mut self, percent: f64) -> Self {
        self.larger_than_window_percent = percent;
        self
    }

    pub fn max_bounds_children(mut self, count: usize) -> Self {
        self.max_bounds_children = count;
        self
    }

    pub fn bounds_parent_depth(mut self, depth: usize) -> Self {
        self.bounds_parent_depth = depth;
        self
    }

    pub fn max_range_child_nodes(mut self, count: usize) -> Self {
        self.max_range_child_nodes = count;
        self
    }

    /// Compile the embed provider pattern, case-insensitively
    pub fn embed_regex(&self) -> Result<Regex> {
        Ok(RegexBuilder::new(&self.embed_pattern)
            .case_insensitive(true)
            .build()?)
    }

    /// Check every value is usable
    pub fn validate(&self) -> Result<()> {
        self.embed_regex()?;
        if !(self.larger_than_window_percent.is_finite() && self.larger_than_window_percent > 0.0) {
            return Err(ShootError::Config(format!(
                "larger_than_window_percent must be a positive number, got {}",
                self.larger_than_window_percent
            )));
        }
        Ok(())
    }

    /// Parse configuration from JSON, missing keys taking their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: HelperConfig =
            serde_json::from_str(json).map_err(|e| ShootError::Config(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
