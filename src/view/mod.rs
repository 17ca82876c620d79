//! Pluggable page views.
//!
//! # Module Structure
//!
//! ```text
//! view/
//! ├── news       # NewsView: what's new on a page and its children
//! ├── registry   # ViewRegistry (name -> view, UI ordering)
//! └── mod.rs     # View trait, Link, ViewContext, ViewError (this file)
//! ```
//!
//! A view answers metadata queries about a page and renders it through a
//! template. Every call gets an explicit [`ViewContext`] carrying the
//! collaborators of the current environment; views hold no state.

pub mod news;
mod registry;

pub use registry::{RegistryError, ViewRegistry};

use crate::{
    core::UrlPath,
    feed::FeedResolver,
    page::{Page, PageTree, TreeError},
    render::{DispatchError, Dispatcher},
    utils::date::DateTimeUtc,
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use thiserror::Error;

/// Separator between title parts, shared by all views.
pub const TITLE_SEPARATOR: &str = " — ";

/// Collaborators available to a view for one request.
#[derive(Clone, Copy)]
pub struct ViewContext<'a> {
    pub pages: &'a dyn PageTree,
    pub feed: &'a dyn FeedResolver,
    pub dispatcher: &'a dyn Dispatcher,
}

/// UI grouping of views. Fixed views sort before variable ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewGroup {
    Fixed,
    Variable,
}

/// Outbound link of a view (e.g. an alternate feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: UrlPath,
    pub rel: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub title: String,
    /// Force (or suppress) a last-modified annotation. `None` leaves it to
    /// the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<bool>,
}

impl Link {
    /// Format as an HTTP `Link` header value.
    ///
    /// `</blog/feed.xml>; rel="alternate"; type="application/rss+xml"; title="..."`
    ///
    /// Titles with non-ASCII or control characters use the RFC 8187
    /// `title*` form, header values must stay printable ASCII.
    pub fn to_header(&self) -> String {
        let plain = self
            .title
            .bytes()
            .all(|b| b.is_ascii() && !b.is_ascii_control());
        let title = if plain {
            format!(
                "title=\"{}\"",
                self.title.replace('\\', "\\\\").replace('"', "\\\"")
            )
        } else {
            format!(
                "title*=UTF-8''{}",
                utf8_percent_encode(&self.title, NON_ALPHANUMERIC)
            )
        };
        format!(
            "<{}>; rel=\"{}\"; type=\"{}\"; {title}",
            self.href.to_encoded(),
            self.rel,
            self.content_type,
        )
    }
}

/// Errors surfaced by views. Collaborator errors pass through unchanged.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("failed to build template arguments")]
    Args(#[from] serde_json::Error),
}

impl ViewError {
    /// The template asked to abort further page processing.
    pub fn is_skip_page(&self) -> bool {
        matches!(self, Self::Dispatch(DispatchError::SkipPage))
    }
}

/// A named rendering and metadata strategy selectable per page.
pub trait View: Send + Sync {
    /// Stable unique identifier, used in URLs (`?view=<name>`).
    fn name(&self) -> &'static str;

    /// Human-readable name.
    fn display(&self) -> &'static str;

    fn group(&self) -> ViewGroup;

    /// Whether this view makes sense for `page`.
    fn is_applicable(&self, ctx: &ViewContext<'_>, page: &Page) -> Result<bool, ViewError>;

    /// Most recent modification, `None` when unknown.
    fn last_modified(
        &self,
        _ctx: &ViewContext<'_>,
        _page: &Page,
    ) -> Result<Option<DateTimeUtc>, ViewError> {
        Ok(None)
    }

    fn title(&self, page: &Page) -> String;

    fn description(&self, _page: &Page) -> Option<String> {
        None
    }

    fn keywords(&self, _page: &Page) -> Option<String> {
        None
    }

    fn allow_robots(&self, ctx: &ViewContext<'_>, page: &Page) -> Result<bool, ViewError>;

    fn links(&self, _ctx: &ViewContext<'_>, _page: &Page) -> Result<Vec<Link>, ViewError> {
        Ok(Vec::new())
    }

    /// Render the view. The markup comes from the dispatcher.
    fn render(&self, ctx: &ViewContext<'_>, page: &Page) -> Result<String, ViewError>;
}

/// Everything a view derives for a page, without rendering.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ViewMetadata {
    pub view: &'static str,
    pub page: UrlPath,
    pub applicable: bool,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    pub allow_robots: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTimeUtc>,
    pub links: Vec<Link>,
}

impl ViewMetadata {
    /// Run every metadata query of `view` against `page`.
    pub fn collect(view: &dyn View, ctx: &ViewContext<'_>, page: &Page) -> Result<Self, ViewError> {
        Ok(Self {
            view: view.name(),
            page: page.path.clone(),
            applicable: view.is_applicable(ctx, page)?,
            title: view.title(page),
            description: view.description(page),
            keywords: view.keywords(page),
            allow_robots: view.allow_robots(ctx, page)?,
            last_modified: view.last_modified(ctx, page)?,
            links: view.links(ctx, page)?,
        })
    }
}
