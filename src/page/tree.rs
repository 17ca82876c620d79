//! Page tree queries.
//!
//! `PageTree` is the read side of the content system as seen by views.
//! Implementors only need to provide [`PageTree::page`]; the traversal
//! queries have default implementations on top of it.

use super::{ElementKind, NewsElement, Page, RobotsPolicy};
use crate::core::UrlPath;
use rustc_hash::FxHashSet;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced while reading the page tree.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("page not found: {0}")]
    PageNotFound(UrlPath),

    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("content parse error in `{0}`")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("page `{0}` is defined more than once")]
    DuplicatePage(UrlPath),
}

/// Read-only queries against the page tree.
pub trait PageTree: Send + Sync {
    /// Fetch a page by path.
    fn page(&self, path: &UrlPath) -> Result<Arc<Page>, TreeError>;

    /// Check for an element of `kind` on the page.
    ///
    /// With `recursive = false` only elements literally on `page` count
    /// (nested elements included). With `recursive = true` child pages are
    /// searched as well, depth-first.
    fn has_element(&self, page: &Page, kind: ElementKind, recursive: bool) -> Result<bool, TreeError> {
        if page.has_direct_element(kind) {
            return Ok(true);
        }
        if !recursive {
            return Ok(false);
        }

        let mut found = false;
        visit_descendants(self, page, |child| {
            found = child.has_direct_element(kind);
            !found
        })?;
        Ok(found)
    }

    /// Resolve the effective robots policy of `page`.
    ///
    /// `Inherit` walks up through the parents. A page without parents that
    /// inherits allows robots; with several parents robots are allowed when
    /// any parent chain allows.
    fn find_allow_robots(&self, page: &Page) -> Result<bool, TreeError> {
        let mut visited: FxHashSet<UrlPath> = FxHashSet::default();
        visited.insert(page.path.clone());

        let mut pending: Vec<Arc<Page>> = Vec::new();
        let mut current = match page.allow_robots {
            RobotsPolicy::Allow => return Ok(true),
            RobotsPolicy::Disallow => return Ok(false),
            RobotsPolicy::Inherit if page.parents.is_empty() => return Ok(true),
            RobotsPolicy::Inherit => page.parents.clone(),
        };

        loop {
            for parent in current.drain(..) {
                if visited.insert(parent.clone()) {
                    pending.push(self.page(&parent)?);
                }
            }
            let Some(next) = pending.pop() else {
                return Ok(false);
            };
            match next.allow_robots {
                RobotsPolicy::Allow => return Ok(true),
                RobotsPolicy::Disallow => {}
                RobotsPolicy::Inherit if next.parents.is_empty() => return Ok(true),
                RobotsPolicy::Inherit => current.extend(next.parents.iter().cloned()),
            }
        }
    }

    /// All news on `page` and its descendants, most recent first.
    ///
    /// Ties keep tree order (page before its children, elements in order).
    fn find_all_news(&self, page: &Page) -> Result<Vec<NewsElement>, TreeError> {
        let mut news: Vec<NewsElement> = page.direct_news().cloned().collect();
        visit_descendants(self, page, |child| {
            news.extend(child.direct_news().cloned());
            true
        })?;
        news.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        Ok(news)
    }
}

/// Depth-first walk over the descendants of `root`, each page once.
///
/// `visit` returns `false` to stop the walk early.
fn visit_descendants<T, F>(tree: &T, root: &Page, mut visit: F) -> Result<(), TreeError>
where
    T: PageTree + ?Sized,
    F: FnMut(&Page) -> bool,
{
    let mut visited: FxHashSet<UrlPath> = FxHashSet::default();
    visited.insert(root.path.clone());
    let mut stack: Vec<UrlPath> = root.children.iter().rev().cloned().collect();

    while let Some(path) = stack.pop() {
        if !visited.insert(path.clone()) {
            continue;
        }
        let child = tree.page(&path)?;
        if !visit(&child) {
            return Ok(());
        }
        stack.extend(child.children.iter().rev().cloned());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::tests::{news, page};
    use crate::utils::date::DateTimeUtc;
    use rustc_hash::FxHashMap;

    /// Minimal tree over a map, relying on the default query methods.
    struct MapTree(FxHashMap<UrlPath, Arc<Page>>);

    impl MapTree {
        fn new(pages: Vec<Page>) -> Self {
            Self(
                pages
                    .into_iter()
                    .map(|p| (p.path.clone(), Arc::new(p)))
                    .collect(),
            )
        }

        fn get(&self, path: &str) -> Arc<Page> {
            self.page(&UrlPath::from_page(path)).unwrap()
        }
    }

    impl PageTree for MapTree {
        fn page(&self, path: &UrlPath) -> Result<Arc<Page>, TreeError> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| TreeError::PageNotFound(path.clone()))
        }
    }

    fn link(parent: &mut Page, child: &mut Page) {
        parent.children.push(child.path.clone());
        child.parents.push(parent.path.clone());
    }

    /// `/` -> `/blog/` -> `/blog/post/` (news only on the post)
    fn blog_tree() -> MapTree {
        let mut root = page("/", "Home", Vec::new());
        let mut blog = page("/blog/", "Blog", Vec::new());
        let mut post = page(
            "/blog/post/",
            "Post",
            vec![news("Older", "2024-01-01"), news("Newer", "2024-03-01")],
        );
        link(&mut root, &mut blog);
        link(&mut blog, &mut post);
        MapTree::new(vec![root, blog, post])
    }

    #[test]
    fn test_has_element_recursive_finds_descendant_news() {
        let tree = blog_tree();
        let root = tree.get("/");
        assert!(tree.has_element(&root, ElementKind::News, true).unwrap());
        assert!(!tree.has_element(&root, ElementKind::News, false).unwrap());
        assert!(!tree.has_element(&root, ElementKind::Heading, true).unwrap());
    }

    #[test]
    fn test_has_element_direct() {
        let tree = blog_tree();
        let post = tree.get("/blog/post/");
        assert!(tree.has_element(&post, ElementKind::News, false).unwrap());
    }

    #[test]
    fn test_has_element_missing_child_is_error() {
        let mut root = page("/", "Home", Vec::new());
        root.children.push(UrlPath::from_page("/gone/"));
        let tree = MapTree::new(vec![root]);
        let root = tree.get("/");
        let err = tree.has_element(&root, ElementKind::News, true).unwrap_err();
        assert!(matches!(err, TreeError::PageNotFound(p) if p == "/gone/"));
    }

    #[test]
    fn test_traversal_survives_cycles() {
        let mut a = page("/a/", "A", Vec::new());
        let mut b = page("/b/", "B", Vec::new());
        link(&mut a, &mut b);
        link(&mut b, &mut a);
        let tree = MapTree::new(vec![a, b]);
        let a = tree.get("/a/");
        assert!(!tree.has_element(&a, ElementKind::News, true).unwrap());
        assert!(tree.find_all_news(&a).unwrap().is_empty());
        assert!(!tree.find_allow_robots(&a).unwrap());
    }

    #[test]
    fn test_find_all_news_most_recent_first() {
        let tree = blog_tree();
        let mut root = (*tree.get("/")).clone();
        root.elements.push(news("Middle", "2024-02-01"));
        let tree = MapTree::new(vec![
            root,
            (*tree.get("/blog/")).clone(),
            (*tree.get("/blog/post/")).clone(),
        ]);

        let dates: Vec<_> = tree
            .find_all_news(&tree.get("/"))
            .unwrap()
            .into_iter()
            .map(|n| n.pub_date)
            .collect();
        assert_eq!(
            dates,
            vec![
                DateTimeUtc::from_ymd(2024, 3, 1),
                DateTimeUtc::from_ymd(2024, 2, 1),
                DateTimeUtc::from_ymd(2024, 1, 1),
            ]
        );
    }

    #[test]
    fn test_find_allow_robots_explicit() {
        let mut p = page("/p/", "P", Vec::new());
        p.allow_robots = RobotsPolicy::Disallow;
        let tree = MapTree::new(vec![p]);
        assert!(!tree.find_allow_robots(&tree.get("/p/")).unwrap());
    }

    #[test]
    fn test_find_allow_robots_inherits_from_parent() {
        let mut root = page("/", "Home", Vec::new());
        root.allow_robots = RobotsPolicy::Disallow;
        let mut child = page("/child/", "Child", Vec::new());
        link(&mut root, &mut child);
        let tree = MapTree::new(vec![root, child]);
        assert!(!tree.find_allow_robots(&tree.get("/child/")).unwrap());
    }

    #[test]
    fn test_find_allow_robots_root_inherit_allows() {
        let tree = blog_tree();
        assert!(tree.find_allow_robots(&tree.get("/blog/post/")).unwrap());
    }

    #[test]
    fn test_find_allow_robots_any_parent_allows() {
        let mut closed = page("/closed/", "Closed", Vec::new());
        closed.allow_robots = RobotsPolicy::Disallow;
        let mut open = page("/open/", "Open", Vec::new());
        open.allow_robots = RobotsPolicy::Allow;
        let mut shared = page("/shared/", "Shared", Vec::new());
        link(&mut closed, &mut shared);
        link(&mut open, &mut shared);
        let tree = MapTree::new(vec![closed, open, shared]);
        assert!(tree.find_allow_robots(&tree.get("/shared/")).unwrap());
    }
}
