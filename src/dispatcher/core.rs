//! Dispatcher core - the per-request execution engine.
//!
//! A dispatch builds the effective handler stack (global middleware in
//! registration order, then the matched route's chain) and drives it with
//! the re-entrant [`Next`] continuation. One handler runs between two
//! advance calls; execution is strictly sequential per request. A fault
//! diverts into the error chain and the normal stack is never resumed.

use std::cell::Cell;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::errors::{ErrorChain, Fault};
use crate::context::RequestContext;
use crate::response::ResponseGuard;
use crate::router::RouteTable;

/// Outcome of one handler invocation. `Err` is the synchronous analogue
/// of throwing: the invoking advance frame routes it into the error chain.
pub type DispatchResult = Result<(), Fault>;

/// A unit of request-handling work: respond through the guard, suspend on
/// I/O, or delegate via the continuation. Middleware and route handlers
/// share this one shape.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, ctx: &RequestContext, res: &ResponseGuard, next: Next<'_>) -> DispatchResult;
}

/// Adapts a plain function or closure into a [`Handler`].
pub struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a RequestContext, &'a ResponseGuard, Next<'a>) -> DispatchResult
        + Send
        + Sync
        + 'static,
{
    fn handle(&self, ctx: &RequestContext, res: &ResponseGuard, next: Next<'_>) -> DispatchResult {
        (self.0)(ctx, res, next)
    }
}

/// Wrap a function or closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a RequestContext, &'a ResponseGuard, Next<'a>) -> DispatchResult
        + Send
        + Sync
        + 'static,
{
    FnHandler(f)
}

/// The continuation handed to every handler.
///
/// `advance()` runs the next handler in the stack; `fail()` diverts into
/// the error chain. The cursor is shared across the whole stack, so a
/// handler advancing twice resumes wherever the first advance left off,
/// and once the response completed, advancing is a silent no-op.
///
/// The continuation carries the canonical request context: a mounted
/// middleware may receive a rebased view as its argument, but everything
/// downstream of an advance sees the original request.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stack: &'a [Arc<dyn Handler>],
    cursor: &'a Cell<usize>,
    ctx: &'a RequestContext,
    res: &'a ResponseGuard,
    errors: &'a ErrorChain,
}

impl Next<'_> {
    /// Proceed to the next handler.
    ///
    /// When the stack is exhausted without a response, emits the terminal
    /// `404 Not Found` exactly once. A fault returned by the invoked
    /// handler is caught here and routed into the error chain.
    pub fn advance(self) -> DispatchResult {
        if self.res.is_completed() {
            return Ok(());
        }
        let index = self.cursor.get();
        if index >= self.stack.len() {
            debug!(
                request_id = %self.ctx.id(),
                path = %self.ctx.path(),
                "handler stack exhausted without a response"
            );
            self.res.not_found();
            return Ok(());
        }
        self.cursor.set(index + 1);
        match self.stack[index].handle(self.ctx, self.res, self) {
            Ok(()) => Ok(()),
            Err(fault) => {
                self.errors.run(fault, self.ctx, self.res);
                Ok(())
            }
        }
    }

    /// Divert into the error chain with the given fault. The normal stack
    /// is not resumed.
    pub fn fail(self, fault: impl Into<Fault>) -> DispatchResult {
        self.errors.run(fault.into(), self.ctx, self.res);
        Ok(())
    }
}

/// The frozen execution engine: route table, middleware stack, and error
/// chain, built once from an [`App`](crate::app::App) and then shared
/// read-only across request coroutines. No locks on the hot path.
pub struct Dispatcher {
    table: RouteTable,
    middleware: Vec<Arc<dyn Handler>>,
    errors: ErrorChain,
}

impl Dispatcher {
    pub(crate) fn new(
        table: RouteTable,
        middleware: Vec<Arc<dyn Handler>>,
        errors: ErrorChain,
    ) -> Self {
        Self {
            table,
            middleware,
            errors,
        }
    }

    /// Run one request through middleware and the matched route chain.
    ///
    /// The guard ends up with exactly one terminal write for any stack
    /// that responds, faults, or exhausts; only a handler that returns
    /// without responding or advancing leaves it untouched.
    pub fn dispatch(&self, mut ctx: RequestContext, res: &ResponseGuard) {
        let start = Instant::now();

        let route_handlers: &[Arc<dyn Handler>] =
            match self.table.lookup(ctx.method(), ctx.path()) {
                Some(hit) => {
                    info!(
                        request_id = %ctx.id(),
                        method = %ctx.method(),
                        path = %ctx.path(),
                        pattern = %hit.pattern,
                        "route matched"
                    );
                    ctx.set_params(hit.params);
                    hit.handlers
                }
                None => {
                    info!(
                        request_id = %ctx.id(),
                        method = %ctx.method(),
                        path = %ctx.path(),
                        "no route matched"
                    );
                    &[]
                }
            };

        let stack: Vec<Arc<dyn Handler>> = self
            .middleware
            .iter()
            .cloned()
            .chain(route_handlers.iter().cloned())
            .collect();

        let cursor = Cell::new(0);
        let next = Next {
            stack: &stack,
            cursor: &cursor,
            ctx: &ctx,
            res,
            errors: &self.errors,
        };
        if let Err(fault) = next.advance() {
            self.errors.run(fault, &ctx, res);
        }

        if res.is_completed() {
            debug!(
                request_id = %ctx.id(),
                status = res.finished_status().unwrap_or(0),
                latency_us = start.elapsed().as_micros() as u64,
                "dispatch complete"
            );
        } else {
            warn!(
                request_id = %ctx.id(),
                method = %ctx.method(),
                path = %ctx.path(),
                "dispatch finished without a response"
            );
        }
    }

    #[must_use]
    pub fn route_count(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    #[must_use]
    pub fn error_handler_count(&self) -> usize {
        self.errors.len()
    }
}
