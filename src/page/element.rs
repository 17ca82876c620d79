//! Page elements.

use crate::utils::date::DateTimeUtc;
use serde::{Deserialize, Serialize};

/// A news entry attached to a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NewsElement {
    pub title: String,
    /// Publication timestamp, used for ordering and last-modified.
    pub pub_date: DateTimeUtc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Page or URL the news points at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Element kind, the unit of `PageTree::has_element` queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    News,
    Heading,
    Section,
}

/// An element owned by a page.
///
/// In the content file, elements are tables tagged by `kind`:
///
/// ```toml
/// [[page.elements]]
/// kind = "news"
/// title = "Version 1.2 released"
/// pub-date = "2024-06-15T14:30:45Z"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    News(NewsElement),
    Heading {
        title: String,
    },
    Section {
        title: String,
        #[serde(default)]
        elements: Vec<Element>,
    },
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::News(_) => ElementKind::News,
            Self::Heading { .. } => ElementKind::Heading,
            Self::Section { .. } => ElementKind::Section,
        }
    }

    /// Nested elements (only sections have any).
    pub fn children(&self) -> &[Element] {
        match self {
            Self::Section { elements, .. } => elements,
            _ => &[],
        }
    }

    pub fn as_news(&self) -> Option<&NewsElement> {
        match self {
            Self::News(news) => Some(news),
            _ => None,
        }
    }
}
