use http::Method;
use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

/// Raw pieces extracted from a transport request, before they become a
/// [`RequestContext`](crate::context::RequestContext).
#[derive(Debug)]
pub struct ParsedRequest {
    /// `None` when the method token does not parse.
    pub method: Option<Method>,
    /// Path with the query string stripped.
    pub path: String,
    /// Raw query string; empty when the URL carries none.
    pub query: String,
    /// HTTP headers with lowercased names.
    pub headers: HashMap<String, String>,
    /// Raw body bytes; `None` for an empty payload.
    pub body: Option<Vec<u8>>,
}

/// Extract method, path, query, headers, and body bytes from a
/// `may_minihttp::Request`.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().parse::<Method>().ok();
    let raw_path = req.path().to_string();
    let (path, query) = match raw_path.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (raw_path, String::new()),
    };

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let body = {
        let mut buf = Vec::new();
        match req.body().read_to_end(&mut buf) {
            Ok(n) if n > 0 => Some(buf),
            _ => None,
        }
    };

    debug!(
        path = %path,
        header_count = headers.len(),
        body_bytes = body.as_ref().map(Vec::len).unwrap_or(0),
        "http request parsed"
    );

    ParsedRequest {
        method,
        path,
        query,
        headers,
        body,
    }
}
