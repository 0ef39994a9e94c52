use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;
use tracing::warn;

use super::request::{parse_request, ParsedRequest};
use super::response::write_finished;
use crate::context::RequestContext;
use crate::dispatcher::Dispatcher;
use crate::ids::RequestId;
use crate::response::{Finished, ResponseGuard, CT_TEXT};

/// The `may_minihttp` service: parses each transport request, runs it
/// through the dispatcher, and flushes the guard's single terminal write.
#[derive(Clone)]
pub struct AppService {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let ParsedRequest {
            method,
            path,
            query,
            headers,
            body,
        } = parse_request(req);

        let Some(method) = method else {
            warn!(path = %path, "unparseable http method");
            write_finished(
                res,
                Finished {
                    status: 400,
                    content_type: CT_TEXT,
                    body: b"Bad Request".to_vec(),
                },
            );
            return Ok(());
        };

        let id = RequestId::from_header_or_new(headers.get("x-request-id").map(String::as_str));
        let mut ctx = RequestContext::new(method, path)
            .with_id(id)
            .with_query(&query)
            .with_headers(headers);
        if let Some(bytes) = body {
            ctx = ctx.with_raw_body(bytes);
        }

        let guard = ResponseGuard::new();
        self.dispatcher.dispatch(ctx, &guard);

        // a handler that neither responded nor advanced leaves the guard
        // empty; the transport then sends its bare default
        if let Some(finished) = guard.take_finished() {
            write_finished(res, finished);
        }
        Ok(())
    }
}
