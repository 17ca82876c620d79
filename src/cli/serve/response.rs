//! HTTP response handlers.

use crate::redirect::Redirect;
use crate::utils::date::DateTimeUtc;
use crate::utils::mime::types::{HTML, PLAIN};
use crate::view::{Link, ViewError};
use anyhow::{Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};
use url::Url;

/// What a view produced for one request.
#[derive(Debug, Default)]
pub struct ViewResponse {
    /// Rendered markup. `None` for HEAD requests.
    pub body: Option<String>,
    pub last_modified: Option<DateTimeUtc>,
    pub allow_robots: bool,
    pub links: Vec<Link>,
}

impl ViewResponse {
    /// Metadata headers of the response.
    fn headers(&self) -> Result<Vec<Header>> {
        let mut headers = vec![make_header("Content-Type", HTML)];
        if let Some(modified) = self.last_modified {
            headers.push(header("Last-Modified", &modified.to_rfc2822())?);
        }
        if !self.allow_robots {
            headers.push(make_header("X-Robots-Tag", "noindex, nofollow"));
        }
        for link in &self.links {
            headers.push(header("Link", &link.to_header())?);
        }
        Ok(headers)
    }
}

/// Respond with a rendered view.
pub fn respond_view(request: Request, view: ViewResponse) -> Result<()> {
    let headers = view.headers()?;
    let mut response = Response::from_string(view.body.unwrap_or_default());
    for header in headers {
        response.add_header(header);
    }
    request.respond(response)?;
    Ok(())
}

/// The template aborted page processing: finish without appending anything.
pub fn respond_skipped(request: Request) -> Result<()> {
    let response = Response::empty(StatusCode(200)).with_header(make_header("Content-Type", HTML));
    request.respond(response)?;
    Ok(())
}

/// Respond with a permanent redirect.
///
/// The location is made absolute against the `Host` header when present.
/// Its path is sent as is, dot segments included.
pub fn respond_redirect(request: Request, redirect: &Redirect) -> Result<()> {
    let location = absolute_location(host_header(&request).as_deref(), &redirect.location);
    let response = Response::empty(StatusCode(redirect.status))
        .with_header(header("Location", &location)?);
    request.respond(response)?;
    Ok(())
}

/// Respond with 404.
pub fn respond_not_found(request: Request) -> Result<()> {
    send_body(request, 404, PLAIN, "404 Not Found")
}

/// Respond with 405 for anything but GET and HEAD.
pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    let response = Response::from_string("405 Method Not Allowed")
        .with_status_code(StatusCode(405))
        .with_header(make_header("Content-Type", PLAIN))
        .with_header(make_header("Allow", "GET, HEAD"));
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, "503 Service Unavailable")
}

/// Respond with a view error (500).
pub fn respond_view_error(request: Request, error: ViewError) -> Result<()> {
    let error_str = format!("{:#}", anyhow::Error::from(error));
    let msg = crate::utils::html::escape(&error_str);
    let body = format!("<html><body><h1>View Error</h1><pre>{msg}</pre></body></html>");
    send_body(request, 500, HTML, &body)
}

pub fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

pub fn is_allowed_method(request: &Request) -> bool {
    matches!(request.method(), Method::Get | Method::Head)
}

/// Get a query parameter from a raw query string.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn host_header(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Host"))
        .map(|h| h.value.to_string())
}

/// Prefix `location` with the origin named by `host`.
///
/// Hosts that carry more than an authority are ignored.
fn absolute_location(host: Option<&str>, location: &str) -> String {
    host.and_then(|host| Url::parse(&format!("http://{host}/")).ok())
        .filter(|base| {
            base.path() == "/"
                && base.query().is_none()
                && base.fragment().is_none()
                && base.username().is_empty()
        })
        .map(|base| format!("{}{location}", base.origin().ascii_serialization()))
        .unwrap_or_else(|| location.to_string())
}

fn send_body(request: Request, status: u16, content_type: &'static str, body: &str) -> Result<()> {
    let response = Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

/// Header with a known-valid static value.
fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).unwrap()
}

/// Header with a computed value, which must be ASCII.
fn header(key: &'static str, value: &str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|_| anyhow!("invalid `{key}` header value: {value}"))
}
