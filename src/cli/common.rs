//! Environment shared by the CLI commands.

use anyhow::{Context, Result};

use crate::config::NewsViewConfig;
use crate::core::UrlPath;
use crate::feed::FeedLocator;
use crate::page::{Page, PageStore, PageTree};
use crate::render::TemplateDispatcher;
use crate::view::{View, ViewContext, ViewRegistry};
use crate::{debug, log};
use std::sync::Arc;

/// Loaded collaborators of the views, shared read-only by all requests.
pub struct Site {
    pub config: NewsViewConfig,
    pub registry: ViewRegistry,
    pub pages: PageStore,
    pub feed: FeedLocator,
    pub dispatcher: TemplateDispatcher,
}

impl Site {
    /// Load the page tree and wire the collaborators from `config`.
    pub fn load(config: NewsViewConfig, registry: ViewRegistry) -> Result<Self> {
        let content_path = config.content_path();
        let pages = PageStore::load(&content_path)
            .with_context(|| format!("Failed to load content from {}", content_path.display()))?;

        log!("content"; "loaded {} page{} of `{}`",
            pages.len(), if pages.len() == 1 { "" } else { "s" }, pages.book().name);
        debug!("template"; "template dir {}", config.template_dir().display());

        Ok(Self {
            feed: FeedLocator::new(&config.feed),
            dispatcher: TemplateDispatcher::new(config.template_dir()),
            config,
            registry,
            pages,
        })
    }

    pub fn ctx(&self) -> ViewContext<'_> {
        ViewContext {
            pages: &self.pages,
            feed: &self.feed,
            dispatcher: &self.dispatcher,
        }
    }

    /// Look up a registered view by name.
    pub fn view(&self, name: &str) -> Result<Arc<dyn View>> {
        self.registry.get(name).with_context(|| {
            let known: Vec<_> = self.registry.views().iter().map(|v| v.name()).collect();
            format!("Unknown view `{name}` (available: {})", known.join(", "))
        })
    }

    /// Fetch a page by its (decoded) path.
    pub fn page(&self, path: &str) -> Result<Arc<Page>> {
        Ok(self.pages.page(&UrlPath::from_page(path))?)
    }
}
