//! The fault type and the error-handler chain.
//!
//! A fault raised anywhere in the handler stack diverts the request into
//! this chain. Each error handler may respond, replace the carried fault,
//! or forward it to the next handler; a handler that itself faults is
//! re-fed into the same chain so later handlers still run. Exhausting the
//! chain without a response emits the fixed 500 fallback, exactly once.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::Arc;
use tracing::{error, warn};

use super::core::DispatchResult;
use crate::context::RequestContext;
use crate::response::ResponseGuard;

/// The error value carried from a faulting handler into the error chain.
///
/// Cloneable by design: the chain may hand the same fault to several
/// handlers before one recovers or the fallback fires.
#[derive(Debug, Clone)]
pub struct Fault {
    message: String,
}

impl Fault {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Fault {}

impl From<&str> for Fault {
    fn from(message: &str) -> Self {
        Fault::new(message)
    }
}

impl From<String> for Fault {
    fn from(message: String) -> Self {
        Fault::new(message)
    }
}

impl From<anyhow::Error> for Fault {
    fn from(err: anyhow::Error) -> Self {
        Fault::new(err.to_string())
    }
}

impl From<serde_json::Error> for Fault {
    fn from(err: serde_json::Error) -> Self {
        Fault::new(err.to_string())
    }
}

/// An error handler: may finish the response, replace the carried fault,
/// or forward it via the continuation.
pub trait ErrorHandler: Send + Sync + 'static {
    fn handle(
        &self,
        err: &Fault,
        ctx: &RequestContext,
        res: &ResponseGuard,
        next: ErrorNext<'_>,
    ) -> DispatchResult;
}

/// Adapts a plain function into an [`ErrorHandler`].
pub struct FnErrorHandler<F>(F);

impl<F> ErrorHandler for FnErrorHandler<F>
where
    F: for<'a> Fn(&'a Fault, &'a RequestContext, &'a ResponseGuard, ErrorNext<'a>) -> DispatchResult
        + Send
        + Sync
        + 'static,
{
    fn handle(
        &self,
        err: &Fault,
        ctx: &RequestContext,
        res: &ResponseGuard,
        next: ErrorNext<'_>,
    ) -> DispatchResult {
        (self.0)(err, ctx, res, next)
    }
}

/// Wrap a function or closure as an error handler.
pub fn error_handler_fn<F>(f: F) -> FnErrorHandler<F>
where
    F: for<'a> Fn(&'a Fault, &'a RequestContext, &'a ResponseGuard, ErrorNext<'a>) -> DispatchResult
        + Send
        + Sync
        + 'static,
{
    FnErrorHandler(f)
}

/// The ordered list of error handlers, terminated by the 500 fallback.
pub struct ErrorChain {
    handlers: Vec<Arc<dyn ErrorHandler>>,
}

impl ErrorChain {
    pub(crate) fn new(handlers: Vec<Arc<dyn ErrorHandler>>) -> Self {
        Self { handlers }
    }

    /// Drive the chain for one fault. The normal handler stack is never
    /// resumed once this runs.
    pub(crate) fn run(&self, fault: Fault, ctx: &RequestContext, res: &ResponseGuard) {
        error!(
            request_id = %ctx.id(),
            method = %ctx.method(),
            path = %ctx.path(),
            error = %fault,
            "handler fault, entering error chain"
        );
        let cursor = Cell::new(0);
        let carried = RefCell::new(fault);
        let next = ErrorNext {
            handlers: &self.handlers,
            cursor: &cursor,
            carried: &carried,
            ctx,
            res,
        };
        let _ = next.run(None);
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }
}

/// The continuation handed to every error handler.
#[derive(Clone, Copy)]
pub struct ErrorNext<'a> {
    handlers: &'a [Arc<dyn ErrorHandler>],
    cursor: &'a Cell<usize>,
    carried: &'a RefCell<Fault>,
    ctx: &'a RequestContext,
    res: &'a ResponseGuard,
}

impl ErrorNext<'_> {
    /// Forward the carried fault to the next error handler.
    pub fn proceed(self) -> DispatchResult {
        self.run(None)
    }

    /// Replace the carried fault and continue the chain with it.
    pub fn replace(self, fault: impl Into<Fault>) -> DispatchResult {
        self.run(Some(fault.into()))
    }

    fn run(self, replacement: Option<Fault>) -> DispatchResult {
        if let Some(fault) = replacement {
            *self.carried.borrow_mut() = fault;
        }
        let index = self.cursor.get();
        if index >= self.handlers.len() {
            let message = self.carried.borrow().message().to_string();
            error!(error = %message, "error chain exhausted, sending fallback");
            self.res.fallback_error(&message);
            return Ok(());
        }
        self.cursor.set(index + 1);
        let current = self.carried.borrow().clone();
        match self.handlers[index].handle(&current, self.ctx, self.res, self) {
            Ok(()) => Ok(()),
            Err(inner) => {
                // a faulting error handler feeds the same chain so later
                // handlers and the fallback still run
                warn!(error = %inner, "error handler faulted, re-feeding chain");
                self.run(Some(inner))
            }
        }
    }
}
