//! Registry of the views available to the host.

use super::View;
use crate::debug;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("view `{0}` is already registered")]
    Duplicate(&'static str),
}

/// Views by name. Built once at startup, then shared read-only.
#[derive(Default)]
pub struct ViewRegistry {
    views: FxHashMap<&'static str, Arc<dyn View>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a view. Names are unique.
    pub fn add_view(&mut self, view: impl View + 'static) -> Result<(), RegistryError> {
        let name = view.name();
        if self.views.contains_key(name) {
            return Err(RegistryError::Duplicate(name));
        }
        debug!("registry"; "registered view `{}`", name);
        self.views.insert(name, Arc::new(view));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn View>> {
        self.views.get(name).cloned()
    }

    /// All views ordered for display: by group, then display name.
    pub fn views(&self) -> Vec<Arc<dyn View>> {
        let mut views: Vec<_> = self.views.values().cloned().collect();
        views.sort_by(|a, b| {
            (a.group(), a.display(), a.name()).cmp(&(b.group(), b.display(), b.name()))
        });
        views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        page::Page,
        view::{ViewContext, ViewError, ViewGroup},
    };

    struct Stub {
        name: &'static str,
        display: &'static str,
        group: ViewGroup,
    }

    impl View for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        fn display(&self) -> &'static str {
            self.display
        }

        fn group(&self) -> ViewGroup {
            self.group
        }

        fn is_applicable(&self, _ctx: &ViewContext<'_>, _page: &Page) -> Result<bool, ViewError> {
            Ok(true)
        }

        fn title(&self, page: &Page) -> String {
            page.title.clone()
        }

        fn allow_robots(&self, _ctx: &ViewContext<'_>, _page: &Page) -> Result<bool, ViewError> {
            Ok(true)
        }

        fn render(&self, _ctx: &ViewContext<'_>, _page: &Page) -> Result<String, ViewError> {
            Ok(String::new())
        }
    }

    fn stub(name: &'static str, display: &'static str, group: ViewGroup) -> Stub {
        Stub {
            name,
            display,
            group,
        }
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = ViewRegistry::new();
        registry.add_view(stub("a", "A", ViewGroup::Fixed)).unwrap();
        let err = registry
            .add_view(stub("a", "Other", ViewGroup::Variable))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate("a")));
        assert_eq!(registry.views().len(), 1);
        assert_eq!(registry.get("a").unwrap().display(), "A");
    }

    #[test]
    fn test_views_ordered_by_group_then_display() {
        let mut registry = ViewRegistry::new();
        registry.add_view(stub("tree", "Tree", ViewGroup::Variable)).unwrap();
        registry.add_view(stub("news", "News", ViewGroup::Fixed)).unwrap();
        registry.add_view(stub("content", "Content", ViewGroup::Variable)).unwrap();
        registry.add_view(stub("all", "All", ViewGroup::Fixed)).unwrap();

        let names: Vec<_> = registry.views().iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["all", "news", "content", "tree"]);
    }

    #[test]
    fn test_get_unknown() {
        let registry = ViewRegistry::new();
        assert!(registry.views().is_empty());
        assert!(registry.get("news").is_none());
    }
}
