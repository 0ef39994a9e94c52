use std::time::Instant;
use tracing::info;

use crate::context::RequestContext;
use crate::dispatcher::{DispatchResult, Handler, Next};
use crate::response::ResponseGuard;

/// Logs one structured line when a request arrives and one when the rest
/// of the stack has run, with the response status and latency.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

impl Handler for RequestLogger {
    fn handle(&self, ctx: &RequestContext, res: &ResponseGuard, next: Next<'_>) -> DispatchResult {
        let start = Instant::now();
        info!(
            request_id = %ctx.id(),
            method = %ctx.method(),
            path = %ctx.path(),
            "request received"
        );
        let out = next.advance();
        info!(
            request_id = %ctx.id(),
            status = res.finished_status().unwrap_or(0),
            latency_ms = start.elapsed().as_millis() as u64,
            "request handled"
        );
        out
    }
}
