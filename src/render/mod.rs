//! Template dispatch.
//!
//! Views hand a target name and an argument bundle to a [`Dispatcher`] and
//! never build markup themselves. [`TemplateDispatcher`] looks targets up
//! in the configured template directory and falls back to the templates
//! embedded in the binary.

mod template;

pub use template::Template;

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};
use thiserror::Error;

/// A JSON object map used as the template argument bundle.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Target of the news view template.
pub const NEWS_VIEW_TARGET: &str = "/news-view/view.html";

/// Templates compiled into the binary, keyed by target.
const EMBEDDED: &[(&str, &str)] = &[(NEWS_VIEW_TARGET, include_str!("embed/view.html"))];

/// Errors raised while dispatching to a template.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Abort further page processing. Not a failure.
    #[error("page processing skipped")]
    SkipPage,

    #[error("IO error when reading template `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("template not found: {0}")]
    NotFound(String),

    #[error("template syntax error in `{target}`: {message}")]
    Syntax { target: String, message: String },
}

/// Renders a template target with an argument bundle.
pub trait Dispatcher: Send + Sync {
    fn include(&self, target: &str, args: &JsonMap) -> Result<String, DispatchError>;
}

/// File-backed dispatcher with embedded fallbacks.
#[derive(Debug, Clone)]
pub struct TemplateDispatcher {
    dir: PathBuf,
}

impl TemplateDispatcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Map a target onto the template directory.
    ///
    /// Targets escaping the directory (`..`, absolute prefixes) map to nothing.
    fn resolve(&self, target: &str) -> Option<PathBuf> {
        let relative = Path::new(target.trim_start_matches('/'));
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        (plain && !relative.as_os_str().is_empty()).then(|| self.dir.join(relative))
    }

    fn load(&self, target: &str) -> Result<String, DispatchError> {
        let not_found = || DispatchError::NotFound(target.to_string());
        let path = self.resolve(target).ok_or_else(not_found)?;

        match fs::read_to_string(&path) {
            Ok(source) => Ok(source),
            Err(err) if err.kind() == io::ErrorKind::NotFound => EMBEDDED
                .iter()
                .find(|(name, _)| *name == target)
                .map(|(_, source)| (*source).to_string())
                .ok_or_else(not_found),
            Err(err) => Err(DispatchError::Io(path, err)),
        }
    }
}

impl Dispatcher for TemplateDispatcher {
    fn include(&self, target: &str, args: &JsonMap) -> Result<String, DispatchError> {
        let source = self.load(target)?;
        let template = Template::parse(&source).map_err(|message| DispatchError::Syntax {
            target: target.to_string(),
            message,
        })?;
        template.render(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> JsonMap {
        let mut map = JsonMap::new();
        map.insert("page".into(), json!({"title": "Blog", "path": "/blog/"}));
        map.insert("feed_enabled".into(), json!(false));
        map.insert("news".into(), json!([]));
        map
    }

    #[test]
    fn test_embedded_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let html = TemplateDispatcher::new(dir.path())
            .include(NEWS_VIEW_TARGET, &args())
            .unwrap();
        assert!(html.contains("<h1>What's New in Blog</h1>"));
        assert!(!html.contains("alternate"));
    }

    #[test]
    fn test_directory_overrides_embedded() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("news-view")).unwrap();
        fs::write(dir.path().join("news-view/view.html"), "custom {{page.path}}").unwrap();

        let html = TemplateDispatcher::new(dir.path())
            .include(NEWS_VIEW_TARGET, &args())
            .unwrap();
        assert_eq!(html, "custom /blog/");
    }

    #[test]
    fn test_unknown_target() {
        let dir = tempfile::tempdir().unwrap();
        let err = TemplateDispatcher::new(dir.path())
            .include("/other/view.html", &args())
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotFound(t) if t == "/other/view.html"));
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = TemplateDispatcher::new(dir.path().join("templates"))
            .include("/../secret.html", &args())
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotFound(_)));
    }

    #[test]
    fn test_syntax_error_names_target() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.html"), "{{#if a}}never closed").unwrap();
        let err = TemplateDispatcher::new(dir.path())
            .include("/broken.html", &args())
            .unwrap_err();
        assert!(err.to_string().contains("/broken.html"));
    }

    #[test]
    fn test_skip_page_propagates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("skip.html"), "{{skip}}").unwrap();
        let err = TemplateDispatcher::new(dir.path())
            .include("/skip.html", &args())
            .unwrap_err();
        assert!(matches!(err, DispatchError::SkipPage));
    }
}
