//! Feed subsystem as seen by views.
//!
//! Views never serialize feeds. They only need to know whether feeds are
//! enabled, where the feed of a page lives, and its media type.

use crate::{
    config::{FeedConfig, FeedFormat},
    core::UrlPath,
    page::Page,
    utils::mime,
};

/// Locates the syndication feed of a page.
pub trait FeedResolver: Send + Sync {
    /// Whether the feed subsystem is enabled in this environment.
    fn is_enabled(&self) -> bool;

    /// Path of the feed for `page`.
    fn resolved_path(&self, page: &Page) -> UrlPath;

    /// Media type of the feeds.
    fn content_type(&self) -> &'static str;
}

/// Config-driven feed locator: one feed file per page directory.
///
/// `/blog/` with `path = "feed.xml"` -> `/blog/feed.xml`
#[derive(Debug, Clone)]
pub struct FeedLocator {
    enable: bool,
    file: String,
    format: FeedFormat,
}

impl FeedLocator {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            enable: config.enable,
            file: config.path.to_string_lossy().into_owned(),
            format: config.format.clone(),
        }
    }
}

impl FeedResolver for FeedLocator {
    fn is_enabled(&self) -> bool {
        self.enable
    }

    fn resolved_path(&self, page: &Page) -> UrlPath {
        page.path.join_file(&self.file)
    }

    fn content_type(&self) -> &'static str {
        match self.format {
            FeedFormat::Rss => mime::types::RSS,
            FeedFormat::Atom => mime::types::ATOM,
        }
    }
}
