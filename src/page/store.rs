//! In-memory page tree loaded from the content file.
//!
//! # Content file
//!
//! ```toml
//! [book]
//! name = "blog"
//! title = "Blog"
//!
//! [[page]]
//! path = "/"
//! title = "Home"
//! robots = "allow"
//! children = ["/releases/"]
//!
//! [[page]]
//! path = "/releases/"
//! title = "Releases"
//!
//! [[page.elements]]
//! kind = "news"
//! title = "Version 1.2 released"
//! pub-date = "2024-06-15T14:30:45Z"
//! ```

use super::{Book, Element, Page, PageTree, RobotsPolicy, TreeError};
use crate::{core::UrlPath, log};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Raw `[[page]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PageSource {
    path: UrlPath,
    title: String,
    #[serde(default)]
    robots: RobotsPolicy,
    #[serde(default)]
    children: Vec<UrlPath>,
    #[serde(default)]
    elements: Vec<Element>,
}

/// Raw content file.
#[derive(Debug, Deserialize)]
struct ContentFile {
    #[serde(default)]
    book: Book,
    #[serde(default, rename = "page")]
    pages: Vec<PageSource>,
}

/// Immutable page tree, shared by all requests.
#[derive(Debug, Default)]
pub struct PageStore {
    book: Arc<Book>,
    pages: FxHashMap<UrlPath, Arc<Page>>,
}

impl PageStore {
    /// Load the content file at `path`.
    pub fn load(path: &Path) -> Result<Self, TreeError> {
        let content =
            fs::read_to_string(path).map_err(|err| TreeError::Io(path.to_path_buf(), err))?;
        Self::parse(&content, path)
    }

    /// Parse content file text. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, TreeError> {
        let file: ContentFile =
            toml::from_str(content).map_err(|err| TreeError::Parse(PathBuf::from(origin), err))?;
        Self::build(file)
    }

    fn build(file: ContentFile) -> Result<Self, TreeError> {
        let book = Arc::new(file.book);

        // Derive parents from the children lists, in declaration order.
        let mut parents: FxHashMap<UrlPath, Vec<UrlPath>> = FxHashMap::default();
        for source in &file.pages {
            for child in &source.children {
                parents
                    .entry(child.clone())
                    .or_default()
                    .push(source.path.clone());
            }
        }

        let mut pages = FxHashMap::default();
        for source in file.pages {
            let page = Page {
                parents: parents.remove(&source.path).unwrap_or_default(),
                path: source.path,
                title: source.title,
                book: Arc::clone(&book),
                allow_robots: source.robots,
                children: source.children,
                elements: source.elements,
            };
            if pages.contains_key(&page.path) {
                return Err(TreeError::DuplicatePage(page.path));
            }
            pages.insert(page.path.clone(), Arc::new(page));
        }

        // Whatever is left references pages that were never defined.
        let mut dangling: Vec<_> = parents.into_keys().collect();
        dangling.sort();
        for path in dangling {
            log!("warning"; "child page `{}` is referenced but not defined", path);
        }

        Ok(Self { book, pages })
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }
}

impl PageTree for PageStore {
    fn page(&self, path: &UrlPath) -> Result<Arc<Page>, TreeError> {
        self.pages
            .get(path)
            .cloned()
            .ok_or_else(|| TreeError::PageNotFound(path.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ElementKind;
    use std::io::Write;

    const CONTENT: &str = r#"
[book]
name = "blog"
title = "Blog"

[[page]]
path = "/"
title = "Home"
robots = "allow"
children = ["/releases/", "/about"]

[[page]]
path = "/releases/"
title = "Releases"

[[page.elements]]
kind = "news"
title = "Version 1.2 released"
pub-date = "2024-06-15T14:30:45Z"

[[page]]
path = "/about/"
title = "About"
robots = "disallow"
"#;

    fn store() -> PageStore {
        PageStore::parse(CONTENT, Path::new("content.toml")).unwrap()
    }

    #[test]
    fn test_parse_builds_tree() {
        let store = store();
        assert_eq!(store.len(), 3);
        assert_eq!(store.book().title, "Blog");

        let releases = store.page(&UrlPath::from_page("/releases/")).unwrap();
        assert_eq!(releases.parents, vec![UrlPath::from_page("/")]);
        assert_eq!(releases.book.name, "blog");
        assert!(releases.has_direct_element(ElementKind::News));

        // "/about" is normalized to a page URL
        let about = store.page(&UrlPath::from_page("/about/")).unwrap();
        assert_eq!(about.allow_robots, RobotsPolicy::Disallow);
        assert_eq!(about.parents.len(), 1);
    }

    #[test]
    fn test_queries_over_store() {
        let store = store();
        let root = store.page(&UrlPath::from_page("/")).unwrap();
        assert!(store.has_element(&root, ElementKind::News, true).unwrap());
        assert!(!store.has_element(&root, ElementKind::News, false).unwrap());
        assert_eq!(store.find_all_news(&root).unwrap().len(), 1);

        let releases = store.page(&UrlPath::from_page("/releases/")).unwrap();
        assert!(store.find_allow_robots(&releases).unwrap());
        let about = store.page(&UrlPath::from_page("/about/")).unwrap();
        assert!(!store.find_allow_robots(&about).unwrap());
    }

    #[test]
    fn test_unknown_page() {
        let err = store().page(&UrlPath::from_page("/nope/")).unwrap_err();
        assert!(matches!(err, TreeError::PageNotFound(_)));
    }

    #[test]
    fn test_duplicate_page() {
        let content = "[[page]]\npath = \"/a/\"\ntitle = \"A\"\n[[page]]\npath = \"/a\"\ntitle = \"Again\"";
        let err = PageStore::parse(content, Path::new("content.toml")).unwrap_err();
        assert!(matches!(err, TreeError::DuplicatePage(p) if p == "/a/"));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = PageStore::parse("[[page]]\ntitle = 1", Path::new("site/content.toml")).unwrap_err();
        assert!(err.to_string().contains("site/content.toml"));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONTENT.as_bytes()).unwrap();
        let store = PageStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_demo_content() {
        let store =
            PageStore::parse(include_str!("../../demo/content.toml"), Path::new("content.toml"))
                .unwrap();
        assert_eq!(store.len(), 4);
        // News nested in a section still counts as on the page
        let release = store.page(&UrlPath::from_page("/releases/1.2/")).unwrap();
        assert!(release.has_direct_element(ElementKind::News));
    }

    #[test]
    fn test_load_missing_file() {
        let err = PageStore::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, TreeError::Io(..)));
    }
}
