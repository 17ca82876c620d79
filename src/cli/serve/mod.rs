//! HTTP server rendering views on demand.
//!
//! `GET /<page>/?view=<name>` renders a registered view for a page (the
//! news view when `view` is absent). The legacy apidocs prefix answers with
//! a permanent redirect.

mod lifecycle;
mod response;

use super::common::Site;
use crate::{
    core::{UrlPath, is_shutdown, register_server},
    debug, log,
    page::{Page, PageTree, TreeError},
    redirect,
    view::{View, ViewContext, ViewError, news},
};
use anyhow::{Context, Result};
use response::ViewResponse;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bind the server and run the request loop until shutdown.
pub fn serve(site: Site) -> Result<()> {
    let serve = &site.config.serve;
    let (server, addr) = lifecycle::bind_with_retry(serve.interface, serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    run_request_loop(&server, Arc::new(site))
}

fn run_request_loop(server: &Server, site: Arc<Site>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(site.config.serve.workers)
        .build()
        .context("Failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let site = Arc::clone(&site);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &site) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, site: &Site) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }
    if !response::is_allowed_method(&request) {
        return response::respond_method_not_allowed(request);
    }

    let url = request.url().to_string();
    let (path, query) = redirect::split_url(&url);

    if let Some(target) = redirect::legacy_redirect(path, query) {
        debug!("redirect"; "{} -> {}", url, target.location);
        return response::respond_redirect(request, &target);
    }

    let view_name = response::query_param(query, "view");
    let Some(view) = site.registry.get(view_name.as_deref().unwrap_or(news::VIEW_NAME)) else {
        return response::respond_not_found(request);
    };

    // Only the requested page itself answers 404. Tree errors raised while
    // the view runs are failures of the host.
    let page = match site.pages.page(&UrlPath::from_browser(path)) {
        Ok(page) => page,
        Err(TreeError::PageNotFound(_)) => return response::respond_not_found(request),
        Err(e) => return serve_error(request, e.into()),
    };

    let with_body = !response::is_head_request(&request);
    match run_view(view.as_ref(), &site.ctx(), &page, with_body) {
        Ok(Some(rendered)) => response::respond_view(request, rendered),
        Ok(None) => response::respond_not_found(request),
        Err(e) => serve_error(request, e),
    }
}

/// Evaluate `view` for `page`. `None` when the view does not apply.
fn run_view(
    view: &dyn View,
    ctx: &ViewContext<'_>,
    page: &Page,
    with_body: bool,
) -> Result<Option<ViewResponse>, ViewError> {
    if !view.is_applicable(ctx, page)? {
        return Ok(None);
    }
    let body = if with_body {
        Some(view.render(ctx, page)?)
    } else {
        None
    };
    Ok(Some(ViewResponse {
        body,
        last_modified: view.last_modified(ctx, page)?,
        allow_robots: view.allow_robots(ctx, page)?,
        links: view.links(ctx, page)?,
    }))
}

fn serve_error(request: Request, error: ViewError) -> Result<()> {
    if error.is_skip_page() {
        debug!("serve"; "{}: page processing skipped", request.url());
        return response::respond_skipped(request);
    }
    log!("error"; "{}: {}", request.url(), error);
    response::respond_view_error(request, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{FeedConfig, NewsViewConfig},
        feed::FeedLocator,
        page::PageStore,
        render::TemplateDispatcher,
        view::ViewRegistry,
    };
    use std::{
        fs,
        io::{Read, Write},
        net::TcpStream,
        path::Path,
        thread,
    };
    use tempfile::TempDir;

    const CONTENT: &str = r#"
[book]
name = "blog"
title = "Blog"

[[page]]
path = "/"
title = "Home"
robots = "allow"
children = ["/releases/", "/about/"]

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
"#;

    /// A site over `content`, with `template` as the news view template.
    fn site(content: &str, template: Option<&str>) -> (Site, TempDir) {
        let dir = TempDir::new().unwrap();
        if let Some(source) = template {
            fs::create_dir_all(dir.path().join("news-view")).unwrap();
            fs::write(dir.path().join("news-view/view.html"), source).unwrap();
        }

        let mut registry = ViewRegistry::new();
        news::register(&mut registry).unwrap();
        let site = Site {
            config: NewsViewConfig::default(),
            registry,
            pages: PageStore::parse(content, Path::new("content.toml")).unwrap(),
            feed: FeedLocator::new(&FeedConfig {
                enable: true,
                ..FeedConfig::default()
            }),
            dispatcher: TemplateDispatcher::new(dir.path()),
        };
        (site, dir)
    }

    /// Send one raw request through `handle_request`, returning the raw response.
    fn exchange(site: &Site, method: &str, url: &str) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let raw = format!(
            "{method} {url} HTTP/1.1\r\nHost: localhost:5277\r\nConnection: close\r\n\r\n"
        );

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            stream.write_all(raw.as_bytes()).unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).unwrap();
            response
        });

        let request = server.recv().unwrap();
        handle_request(request, site).unwrap();
        client.join().unwrap()
    }

    fn status(response: &str) -> &str {
        response.lines().next().unwrap_or_default()
    }

    fn body(response: &str) -> &str {
        response.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or_default()
    }

    fn header<'a>(response: &'a str, name: &str) -> Option<&'a str> {
        let (head, _) = response.split_once("\r\n\r\n")?;
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    #[test]
    fn test_get_renders_news_view() {
        let (site, _dir) = site(CONTENT, None);
        let response = exchange(&site, "GET", "/releases/");

        assert_eq!(status(&response), "HTTP/1.1 200 OK");
        assert!(body(&response).contains("Version 1.2 released"));
        assert_eq!(
            header(&response, "Last-Modified"),
            Some("Sat, 15 Jun 2024 14:30:45 GMT")
        );
        assert!(
            header(&response, "Link")
                .unwrap()
                .starts_with("</releases/feed.xml>; rel=\"alternate\"")
        );
        assert_eq!(header(&response, "X-Robots-Tag"), None);
    }

    #[test]
    fn test_descendant_news_is_noindex() {
        let (site, _dir) = site(CONTENT, None);
        let response = exchange(&site, "GET", "/?view=news");

        assert_eq!(status(&response), "HTTP/1.1 200 OK");
        assert_eq!(header(&response, "X-Robots-Tag"), Some("noindex, nofollow"));
    }

    #[test]
    fn test_head_skips_rendering() {
        // Rendering this template fails, so a 200 proves it never ran
        let (site, _dir) = site(CONTENT, Some("{{#if news}}"));
        let response = exchange(&site, "HEAD", "/releases/");

        assert_eq!(status(&response), "HTTP/1.1 200 OK");
        assert_eq!(body(&response), "");
        assert_eq!(
            header(&response, "Last-Modified"),
            Some("Sat, 15 Jun 2024 14:30:45 GMT")
        );

        let response = exchange(&site, "GET", "/releases/");
        assert!(status(&response).starts_with("HTTP/1.1 500"));
        assert!(body(&response).contains("is never closed"));
    }

    #[test]
    fn test_skip_page_is_empty_ok() {
        let (site, _dir) = site(CONTENT, Some("before {{skip}} after"));
        let response = exchange(&site, "GET", "/releases/");

        assert_eq!(status(&response), "HTTP/1.1 200 OK");
        assert_eq!(body(&response), "");
    }

    #[test]
    fn test_not_applicable_is_not_found() {
        let (site, _dir) = site(CONTENT, None);
        let response = exchange(&site, "GET", "/about/");
        assert!(status(&response).starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn test_unknown_page_or_view_is_not_found() {
        let (site, _dir) = site(CONTENT, None);
        assert!(status(&exchange(&site, "GET", "/missing/")).starts_with("HTTP/1.1 404"));
        assert!(status(&exchange(&site, "GET", "/releases/?view=tree")).starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn test_dangling_child_is_server_error() {
        let content = "[[page]]\npath = \"/\"\ntitle = \"Home\"\nchildren = [\"/gone/\"]\n";
        let (site, _dir) = site(content, None);
        let response = exchange(&site, "GET", "/");

        assert!(status(&response).starts_with("HTTP/1.1 500"));
        assert!(body(&response).contains("/gone/"));
    }

    #[test]
    fn test_other_methods_not_allowed() {
        let (site, _dir) = site(CONTENT, None);
        let response = exchange(&site, "DELETE", "/releases/");

        assert!(status(&response).starts_with("HTTP/1.1 405"));
        assert_eq!(header(&response, "Allow"), Some("GET, HEAD"));
    }

    #[test]
    fn test_legacy_redirect_keeps_path() {
        let (site, _dir) = site(CONTENT, None);
        let response = exchange(&site, "GET", "/news/view/apidocs/com/a/../../x.html?q=%7B");

        assert!(status(&response).starts_with("HTTP/1.1 301"));
        assert_eq!(
            header(&response, "Location"),
            Some("http://localhost:5277/news/view/apidocs/com.semanticcms.news.view/com/a/../../x.html?q=%7B")
        );
    }
}
