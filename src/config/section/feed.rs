//! `[feed]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [feed]
//! enable = true        # Advertise feeds as alternate links
//! path = "feed.xml"    # Feed file name below each page
//! format = "rss"       # rss | atom
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Feed output format.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    /// RSS 2.0 format (default).
    #[default]
    Rss,
    /// Atom 1.0 format.
    Atom,
}

/// Feed subsystem settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Enable the feed subsystem.
    pub enable: bool,
    /// Feed file name, resolved below each page path.
    pub path: PathBuf,
    /// Feed format (RSS 2.0 or Atom 1.0).
    pub format: FeedFormat,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enable: false,
            path: "feed.xml".into(),
            format: FeedFormat::Rss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert!(!config.feed.enable);
        assert_eq!(config.feed.path, PathBuf::from("feed.xml"));
        assert_eq!(config.feed.format, FeedFormat::Rss);
    }

    #[test]
    fn test_custom_config() {
        let config =
            test_parse_config("[feed]\nenable = true\npath = \"atom.xml\"\nformat = \"atom\"");
        assert!(config.feed.enable);
        assert_eq!(config.feed.path, PathBuf::from("atom.xml"));
        assert_eq!(config.feed.format, FeedFormat::Atom);
    }
}
