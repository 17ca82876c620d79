//! Page tree types: pages, elements, robots policy, and storage.
//!
//! # Module Structure
//!
//! ```text
//! page/
//! ├── element   # Element kinds (news, heading, section)
//! ├── robots    # Per-page robots policy
//! ├── tree      # PageTree query trait + TreeError
//! └── store     # In-memory PageStore loaded from the content file
//! ```

mod element;
mod robots;
mod store;
mod tree;

pub use element::{Element, ElementKind, NewsElement};
pub use robots::RobotsPolicy;
pub use store::PageStore;
pub use tree::{PageTree, TreeError};

use crate::core::UrlPath;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The collection ("book") a page belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    /// Short identifier, used in logs.
    pub name: String,
    /// Display title. May be empty.
    pub title: String,
}

/// A node of the page tree.
///
/// Read-only once the tree is loaded. `parents` is derived from the
/// `children` lists of the other pages.
#[derive(Debug, Clone)]
pub struct Page {
    pub path: UrlPath,
    pub title: String,
    pub book: Arc<Book>,
    pub allow_robots: RobotsPolicy,
    pub children: Vec<UrlPath>,
    pub parents: Vec<UrlPath>,
    pub elements: Vec<Element>,
}

impl Page {
    /// Iterate every element on this page, nested ones included.
    ///
    /// Never crosses into child pages.
    pub fn walk_elements(&self) -> impl Iterator<Item = &Element> {
        let mut stack: Vec<&Element> = self.elements.iter().rev().collect();
        std::iter::from_fn(move || {
            let element = stack.pop()?;
            stack.extend(element.children().iter().rev());
            Some(element)
        })
    }

    /// Check for an element of `kind` literally on this page.
    pub fn has_direct_element(&self, kind: ElementKind) -> bool {
        self.walk_elements().any(|e| e.kind() == kind)
    }

    /// News elements literally on this page.
    pub fn direct_news(&self) -> impl Iterator<Item = &NewsElement> {
        self.walk_elements().filter_map(Element::as_news)
    }
}
