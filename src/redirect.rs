//! Legacy apidocs redirect.
//!
//! The API docs moved under a module-qualified directory. Old links keep
//! working through a permanent redirect:
//!
//! `/news/view/apidocs/com/foo/Bar.html?x=1`
//! -> `/news/view/apidocs/com.semanticcms.news.view/com/foo/Bar.html?x=1`

/// Prefix of the old apidocs location.
pub const LEGACY_PREFIX: &str = "/news/view/apidocs/com";

/// Prefix the old location maps to.
pub const TARGET_PREFIX: &str = "/news/view/apidocs/com.semanticcms.news.view/com";

/// HTTP status of the redirect.
pub const MOVED_PERMANENTLY: u16 = 301;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub status: u16,
    pub location: String,
}

/// Rewrite a request under [`LEGACY_PREFIX`].
///
/// `path` is the raw request path, `query` the raw query string without
/// `?`. Both are carried over unchanged. Returns `None` for paths outside
/// the legacy prefix (`/news/view/apidocs/community` is not under it).
pub fn legacy_redirect(path: &str, query: Option<&str>) -> Option<Redirect> {
    let rest = path.strip_prefix(LEGACY_PREFIX)?;
    if !(rest.is_empty() || rest.starts_with('/')) {
        return None;
    }

    let mut location = format!("{TARGET_PREFIX}{rest}");
    if let Some(query) = query {
        location.push('?');
        location.push_str(query);
    }
    Some(Redirect {
        status: MOVED_PERMANENTLY,
        location,
    })
}

/// Split a raw request URL into path and query.
pub fn split_url(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}
