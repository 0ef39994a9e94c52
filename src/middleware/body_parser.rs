use tracing::debug;

use crate::context::RequestContext;
use crate::dispatcher::{DispatchResult, Handler, Next};
use crate::response::ResponseGuard;

/// Parses the raw request payload as JSON into `ctx.body`.
///
/// Runs only for methods that carry a body (POST/PUT/PATCH) and skips
/// requests with `content-length: 0` or no payload at all. A malformed
/// payload diverts the request into the error chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBodyParser;

impl Handler for JsonBodyParser {
    fn handle(&self, ctx: &RequestContext, _res: &ResponseGuard, next: Next<'_>) -> DispatchResult {
        let carries_body = matches!(ctx.method().as_str(), "POST" | "PUT" | "PATCH");
        if !carries_body || ctx.header("content-length") == Some("0") {
            return next.advance();
        }
        let raw = match ctx.raw_body() {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return next.advance(),
        };
        match serde_json::from_slice(raw) {
            Ok(value) => {
                debug!(request_id = %ctx.id(), bytes = raw.len(), "json body parsed");
                ctx.set_body(value);
                next.advance()
            }
            Err(err) => next.fail(err),
        }
    }
}
