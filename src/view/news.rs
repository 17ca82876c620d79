//! The news view: what's new on a page and all of its children.

use super::{Link, TITLE_SEPARATOR, View, ViewContext, ViewError, ViewGroup, ViewRegistry};
use crate::{
    page::{ElementKind, Page},
    render::{JsonMap, NEWS_VIEW_TARGET},
    utils::date::DateTimeUtc,
};
use serde_json::{Value, json};

/// View name, as used in `?view=`.
pub const VIEW_NAME: &str = "news";

/// Register the news view. Call once at startup.
pub fn register(registry: &mut ViewRegistry) -> Result<(), super::RegistryError> {
    registry.add_view(NewsView)
}

/// Lists the news elements of a page and its descendants.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsView;

impl View for NewsView {
    fn name(&self) -> &'static str {
        VIEW_NAME
    }

    fn display(&self) -> &'static str {
        "News"
    }

    fn group(&self) -> ViewGroup {
        ViewGroup::Fixed
    }

    fn is_applicable(&self, ctx: &ViewContext<'_>, page: &Page) -> Result<bool, ViewError> {
        Ok(ctx.pages.has_element(page, ElementKind::News, true)?)
    }

    fn last_modified(
        &self,
        ctx: &ViewContext<'_>,
        page: &Page,
    ) -> Result<Option<DateTimeUtc>, ViewError> {
        let news = ctx.pages.find_all_news(page)?;
        Ok(news.iter().map(|n| n.pub_date).max())
    }

    fn title(&self, page: &Page) -> String {
        let book_title = &page.book.title;
        if book_title.is_empty() {
            format!("What's New{TITLE_SEPARATOR}{}", page.title)
        } else {
            format!(
                "What's New{TITLE_SEPARATOR}{}{TITLE_SEPARATOR}{book_title}",
                page.title
            )
        }
    }

    fn description(&self, page: &Page) -> Option<String> {
        Some(format!("What's New in {}", page.title))
    }

    fn allow_robots(&self, ctx: &ViewContext<'_>, page: &Page) -> Result<bool, ViewError> {
        // Own news only, descendant news never makes a page indexable.
        Ok(ctx.pages.find_allow_robots(page)?
            && ctx.pages.has_element(page, ElementKind::News, false)?)
    }

    fn links(&self, ctx: &ViewContext<'_>, page: &Page) -> Result<Vec<Link>, ViewError> {
        if !(ctx.feed.is_enabled() && self.is_applicable(ctx, page)?) {
            return Ok(Vec::new());
        }
        Ok(vec![Link {
            href: ctx.feed.resolved_path(page),
            rel: "alternate".to_string(),
            content_type: ctx.feed.content_type().to_string(),
            title: self.title(page),
            last_modified: None,
        }])
    }

    fn render(&self, ctx: &ViewContext<'_>, page: &Page) -> Result<String, ViewError> {
        let args = render_args(ctx, page)?;
        Ok(ctx.dispatcher.include(NEWS_VIEW_TARGET, &args)?)
    }
}

/// Argument bundle handed to the template.
fn render_args(ctx: &ViewContext<'_>, page: &Page) -> Result<JsonMap, ViewError> {
    let feed_enabled = ctx.feed.is_enabled();
    let news = ctx.pages.find_all_news(page)?;

    let mut args = JsonMap::new();
    args.insert(
        "page".into(),
        json!({
            "path": page.path,
            "title": page.title,
            "book": { "name": page.book.name, "title": page.book.title },
        }),
    );
    args.insert("feed_enabled".into(), Value::Bool(feed_enabled));
    if feed_enabled {
        args.insert(
            "feed".into(),
            json!({
                "path": ctx.feed.resolved_path(page),
                "type": ctx.feed.content_type(),
            }),
        );
    }
    args.insert("news".into(), serde_json::to_value(news)?);
    Ok(args)
}
