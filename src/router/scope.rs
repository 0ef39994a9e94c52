//! Nestable routers and prefix-scoped middleware.
//!
//! A [`Router`] is a standalone route list plus middleware bindings. It
//! only becomes matchable when mounted (on an [`App`](crate::app::App) or
//! a parent router): mounting joins each contained pattern with the mount
//! prefix (compiled later against the combined path so parameter
//! positions stay correct) and wraps each contained middleware so it
//! fires only under the prefix with a rebased view of the request.

use http::Method;
use std::sync::Arc;

use super::pattern::{join_pattern, prefix_matches};
use crate::context::RequestContext;
use crate::dispatcher::{DispatchResult, Handler, Next};
use crate::response::ResponseGuard;

/// A middleware registration, optionally scoped to a path prefix.
/// Prefix matching is a plain boundary-aware prefix test, never pattern
/// compilation.
pub(crate) struct MiddlewareBinding {
    pub(crate) prefix: Option<String>,
    pub(crate) handler: Arc<dyn Handler>,
}

/// A route awaiting compilation. Patterns stay as source text until build
/// time so mounting can re-derive them under the combined prefix.
pub(crate) struct PendingRoute {
    pub(crate) method: Method,
    pub(crate) pattern: String,
    pub(crate) handlers: Vec<Arc<dyn Handler>>,
}

/// A nestable route table and middleware list.
#[derive(Default)]
pub struct Router {
    pub(crate) routes: Vec<PendingRoute>,
    pub(crate) middleware: Vec<MiddlewareBinding>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route with an explicit method and handler chain.
    pub fn route(&mut self, method: Method, pattern: &str, handlers: Vec<Arc<dyn Handler>>) {
        self.routes.push(PendingRoute {
            method,
            pattern: pattern.to_string(),
            handlers,
        });
    }

    pub fn get<H: Handler>(&mut self, pattern: &str, handler: H) {
        self.route(Method::GET, pattern, vec![Arc::new(handler) as Arc<dyn Handler>]);
    }

    pub fn post<H: Handler>(&mut self, pattern: &str, handler: H) {
        self.route(Method::POST, pattern, vec![Arc::new(handler) as Arc<dyn Handler>]);
    }

    pub fn put<H: Handler>(&mut self, pattern: &str, handler: H) {
        self.route(Method::PUT, pattern, vec![Arc::new(handler) as Arc<dyn Handler>]);
    }

    pub fn delete<H: Handler>(&mut self, pattern: &str, handler: H) {
        self.route(
            Method::DELETE,
            pattern,
            vec![Arc::new(handler) as Arc<dyn Handler>],
        );
    }

    /// Register middleware that runs for every request.
    pub fn middleware<H: Handler>(&mut self, handler: H) {
        self.middleware.push(MiddlewareBinding {
            prefix: None,
            handler: Arc::new(handler),
        });
    }

    /// Register middleware gated behind a path prefix. The prefix is
    /// re-tested on every invocation against the current path.
    pub fn middleware_at<H: Handler>(&mut self, prefix: &str, handler: H) {
        self.middleware.push(MiddlewareBinding {
            prefix: Some(prefix.to_string()),
            handler: Arc::new(handler),
        });
    }

    /// Freeze this router into a compiled route table and a flat
    /// middleware stack. Prefix bindings become invocation-time gates.
    pub(crate) fn into_table_and_middleware(
        self,
    ) -> (super::core::RouteTable, Vec<Arc<dyn Handler>>) {
        let mut table = super::core::RouteTable::new();
        for route in self.routes {
            table.register(route.method, &route.pattern, route.handlers);
        }
        let middleware = self
            .middleware
            .into_iter()
            .map(|binding| match binding.prefix {
                Some(p) => Arc::new(PrefixGated::new(p, binding.handler)) as Arc<dyn Handler>,
                None => binding.handler,
            })
            .collect();
        (table, middleware)
    }

    /// Mount a child router under a prefix.
    ///
    /// Child routes are re-registered as `prefix + pattern`; child
    /// middleware is wrapped to fire only under the prefix, seeing the
    /// request rebased to the suffix.
    pub fn mount(&mut self, prefix: &str, child: Router) {
        for route in child.routes {
            self.routes.push(PendingRoute {
                method: route.method,
                pattern: join_pattern(prefix, &route.pattern),
                handlers: route.handlers,
            });
        }
        for binding in child.middleware {
            let inner = match binding.prefix {
                Some(p) => Arc::new(PrefixGated::new(p, binding.handler)) as Arc<dyn Handler>,
                None => binding.handler,
            };
            self.middleware.push(MiddlewareBinding {
                prefix: None,
                handler: Arc::new(Mounted::new(prefix.to_string(), inner)),
            });
        }
    }
}

/// Gates a middleware behind a path prefix without rewriting the request.
pub(crate) struct PrefixGated {
    prefix: String,
    inner: Arc<dyn Handler>,
}

impl PrefixGated {
    pub(crate) fn new(prefix: String, inner: Arc<dyn Handler>) -> Self {
        Self { prefix, inner }
    }
}

impl Handler for PrefixGated {
    fn handle(&self, ctx: &RequestContext, res: &ResponseGuard, next: Next<'_>) -> DispatchResult {
        if prefix_matches(&self.prefix, ctx.path()) {
            self.inner.handle(ctx, res, next)
        } else {
            next.advance()
        }
    }
}

/// Wraps a mounted router's middleware: fires only under the mount prefix
/// and hands the middleware a rebased view of the request. The
/// continuation keeps driving the rest of the stack with the original
/// context, so siblings and outer layers observe the unmodified path.
pub(crate) struct Mounted {
    prefix: String,
    inner: Arc<dyn Handler>,
}

impl Mounted {
    pub(crate) fn new(prefix: String, inner: Arc<dyn Handler>) -> Self {
        Self { prefix, inner }
    }
}

impl Handler for Mounted {
    fn handle(&self, ctx: &RequestContext, res: &ResponseGuard, next: Next<'_>) -> DispatchResult {
        if !prefix_matches(&self.prefix, ctx.path()) {
            return next.advance();
        }
        let scoped = ctx.rebased(&self.prefix);
        self.inner.handle(&scoped, res, next)
    }
}
